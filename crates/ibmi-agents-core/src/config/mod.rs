//! Configuration
//!
//! - `McpSettings` / `AppSettings`: process environment (`MCP_URL`,
//!   `MCP_TRANSPORT`, `DEBUG`, `LOG_LEVEL`)
//! - `AgentConfigManager`: the YAML agent config file
//! - `ToolsetConfig`: declarative tool selection inside that file

mod error;
mod file;
mod settings;
mod toolset;

pub use error::{ConfigError, ConfigResult};
pub use file::{
    resolve_config_path, AgentConfigManager, AgentModelConfig, AgentsConfig, ChatConfig, ConfigFile, ConfigSource,
    CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, FALLBACK_MODEL,
};
pub use settings::{AppSettings, McpOverrides, McpSettings, McpTransport, DEFAULT_LOG_LEVEL, DEFAULT_MCP_URL};
pub use toolset::{MatchRule, RuleConfig, ToolsetConfig};
