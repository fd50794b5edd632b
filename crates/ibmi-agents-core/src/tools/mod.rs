//! Tool filtering, registration and argument coercion
//!
//! ```text
//! ┌──────────────┐  list_tools   ┌───────────────────┐  accepted   ┌──────────────┐
//! │   Session    │ ────────────▶ │ ToolCatalogFilter │ ──────────▶ │  NameFilter  │
//! │ (rmcp/mock)  │               │ annotation rules  │             │ incl / excl  │
//! └──────────────┘               └───────────────────┘             └──────┬───────┘
//!        ▲                                                                │
//!        │ call_tool(name, coerced args)                                  ▼
//!        │                                                    ┌─────────────────────┐
//!        └─────────────────────────────────────────────────── │   ToolRegistrar     │
//!                                                             │ coercing actions    │
//!                                                             └─────────────────────┘
//! ```
//!
//! ```rust,ignore
//! use ibmi_agents_core::tools::{presets, ToolRegistrar};
//!
//! let registrar = ToolRegistrar::new(presets::performance(), logger)?;
//! registrar.set_session(session);
//! registrar.initialize().await?;
//!
//! let output = registrar.invoke("system_status", arguments).await?;
//! ```

mod coerce;
mod error;
mod filter;
mod names;
pub mod presets;
mod provider;
mod registrar;
mod rules;

pub use coerce::{coerce_arguments, Coercion, CoercionMode, CoercionWarning, DeclaredType, ParameterSchema};
pub use error::{ToolError, ToolResult};
pub use filter::{FilterSpec, InclusionDecision, Rejection, ToolCatalogFilter, ToolFilterOptions, Toolsets};
pub use names::NameFilter;
pub use provider::ToolProvider;
pub use registrar::{
    ActionOutput, ActionRegistry, CallContext, CollisionPolicy, RegisteredAction, RegistrarOptions, RegistrarState,
    ToolRegistrar,
};
pub use rules::{AnnotationPredicate, DescriptorPredicate, FilterRule};
