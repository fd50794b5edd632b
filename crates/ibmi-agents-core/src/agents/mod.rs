//! IBM i agents
//!
//! Each agent pairs a persona with a tool set filtered from the shared MCP
//! catalogue by its `toolsets` annotation. Model settings and tool
//! selection can be overridden per agent in the config file.

mod definition;
mod ids;
mod profile;

pub use definition::{all_definitions, apply_agent_config, AgentDefinition, AgentSettings};
pub use ids::AgentId;
pub use profile::{all_profiles, profile, AgentProfile, USER_PLACEHOLDER};
