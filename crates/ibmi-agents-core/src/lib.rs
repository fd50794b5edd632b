//! IBM i Agents Core
//!
//! Filtered MCP tool sets for IBM i agents. A shared MCP server exposes one
//! large catalogue of SQL-backed tools; every agent only sees the slice
//! selected by its annotation filter, and every call is shaped to the
//! tool's declared parameter types before it is forwarded.
//!
//! ## Tool Registration
//!
//! ```rust,ignore
//! use ibmi_agents_core::{mcp, tools::presets, ToolRegistrar, McpSettings};
//!
//! let session = mcp::connect_session(&McpSettings::from_env()?, logger.clone()).await?;
//! let registrar = ToolRegistrar::new(presets::performance(), logger)?;
//! registrar.set_session(session);
//! registrar.initialize().await?;
//!
//! // Arguments are coerced to the schema ("5" -> 5) before the call
//! let output = registrar.invoke("active_job_info", arguments).await?;
//! ```

pub mod agents;
pub mod config;
pub mod logging;
pub mod mcp;
pub mod session;
pub mod tools;
pub mod types;

// Re-export commonly used types
pub use types::{AnnotationValue, Annotations, Scalar, Tool, ToolCall, ToolDescriptor};

pub use logging::{ConsoleLogger, Logger, MemoryLogger, NoOpLogger};

pub use config::{AgentConfigManager, AppSettings, ConfigError, ConfigResult, McpSettings, McpTransport, ToolsetConfig};

pub use session::{CallOutcome, MockSession, Session, SessionError, SessionResult};

pub use tools::{
    ActionOutput, CoercionMode, CollisionPolicy, FilterRule, FilterSpec, RegisteredAction, RegistrarOptions,
    RegistrarState, ToolCatalogFilter, ToolError, ToolFilterOptions, ToolProvider, ToolRegistrar, ToolResult,
};

pub use agents::{AgentDefinition, AgentId};

// MCP client using official rmcp SDK
pub use mcp::{connect_session, McpClient, McpError, McpResult};
