//! Agent configuration file (YAML)
//!
//! The file path is resolved in order of precedence:
//! 1. an explicitly provided path
//! 2. the `AGENT_CONFIG_PATH` environment variable
//! 3. `infra/config.yaml`, relative to the working directory

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::settings::McpOverrides;
use super::toolset::ToolsetConfig;
use crate::agents::AgentId;

pub const DEFAULT_CONFIG_PATH: &str = "infra/config.yaml";
pub const CONFIG_PATH_ENV: &str = "AGENT_CONFIG_PATH";
/// Model used when neither the agent nor `agents.default_model` names one
pub const FALLBACK_MODEL: &str = "openai:gpt-4o";

/// Configuration file structure; unknown keys are ignored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub available_models: Vec<String>,

    #[serde(default)]
    pub chat: Option<ChatConfig>,

    #[serde(default)]
    pub agents: Option<AgentsConfig>,

    #[serde(default)]
    pub mcp: Option<McpOverrides>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Agent id to suggested prompts
    #[serde(default)]
    pub quick_prompts: BTreeMap<String, Vec<String>>,
}

/// The `agents:` section
///
/// Besides `default_model`, every key is an agent id whose value is parsed
/// into [`AgentModelConfig`] when queried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default = "default_model")]
    pub default_model: Option<String>,

    #[serde(flatten)]
    pub entries: BTreeMap<String, serde_yaml::Value>,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            entries: BTreeMap::new(),
        }
    }
}

fn default_model() -> Option<String> {
    Some(FALLBACK_MODEL.to_string())
}

fn enabled() -> Option<bool> {
    Some(true)
}

fn disabled() -> Option<bool> {
    Some(false)
}

/// Settings for one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentModelConfig {
    /// `provider:model_id`, e.g. `openai:gpt-4o` or `watsonx:llama-3-3-70b-instruct`
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default = "enabled")]
    pub enable_reasoning: Option<bool>,

    #[serde(default = "disabled")]
    pub debug_mode: Option<bool>,

    /// Overrides the agent's built-in tool selection
    #[serde(default)]
    pub toolset: Option<ToolsetConfig>,
}

impl Default for AgentModelConfig {
    fn default() -> Self {
        Self {
            model: None,
            enable_reasoning: enabled(),
            debug_mode: disabled(),
            toolset: None,
        }
    }
}

/// Where the config path came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit,
    Environment,
    Default,
}

impl ConfigSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigSource::Explicit => "explicit",
            ConfigSource::Environment => "environment",
            ConfigSource::Default => "default",
        }
    }
}

/// Pick the config path and record which rule chose it
pub fn resolve_config_path<F>(explicit: Option<&Path>, lookup: F) -> (PathBuf, ConfigSource)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        return (path.to_path_buf(), ConfigSource::Explicit);
    }
    if let Some(path) = lookup(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return (PathBuf::from(path), ConfigSource::Environment);
    }
    (PathBuf::from(DEFAULT_CONFIG_PATH), ConfigSource::Default)
}

/// Loads the agent config file and answers per-agent queries
pub struct AgentConfigManager {
    path: PathBuf,
    source: ConfigSource,
    config: RwLock<ConfigFile>,
}

impl AgentConfigManager {
    /// Load from `explicit`, `AGENT_CONFIG_PATH` or the default path
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_lookup(explicit, |key| std::env::var(key).ok())
    }

    /// Load from exactly this path
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::load(Some(path.as_ref()))
    }

    pub fn load_with_lookup<F>(explicit: Option<&Path>, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (path, source) = resolve_config_path(explicit, lookup);
        let config = read_config_file(&path)?;
        Ok(Self {
            path,
            source,
            config: RwLock::new(config),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Human readable origin, e.g. `environment variable AGENT_CONFIG_PATH: /etc/agents.yaml`
    pub fn source_description(&self) -> String {
        match self.source {
            ConfigSource::Explicit => format!("explicit path: {}", self.path.display()),
            ConfigSource::Environment => {
                format!("environment variable {}: {}", CONFIG_PATH_ENV, self.path.display())
            }
            ConfigSource::Default => format!("default: {}", self.path.display()),
        }
    }

    /// Re-read the file from disk
    ///
    /// On error the previously loaded configuration is kept.
    pub fn reload(&self) -> ConfigResult<()> {
        let config = read_config_file(&self.path)?;
        *self.config.write() = config;
        Ok(())
    }

    /// Snapshot of the parsed file
    pub fn config(&self) -> ConfigFile {
        self.config.read().clone()
    }

    pub fn available_models(&self) -> Vec<String> {
        self.config.read().available_models.clone()
    }

    /// Quick prompts for one agent; empty when none are configured
    pub fn quick_prompts(&self, agent: &str) -> Vec<String> {
        self.config
            .read()
            .chat
            .as_ref()
            .and_then(|chat| chat.quick_prompts.get(agent).cloned())
            .unwrap_or_default()
    }

    pub fn all_quick_prompts(&self) -> BTreeMap<String, Vec<String>> {
        self.config
            .read()
            .chat
            .as_ref()
            .map(|chat| chat.quick_prompts.clone())
            .unwrap_or_default()
    }

    /// Model for an agent, falling back to `default_model` and then to
    /// [`FALLBACK_MODEL`]
    pub fn agent_model(&self, agent: impl AsRef<str>) -> ConfigResult<String> {
        let id: AgentId = agent.as_ref().parse()?;
        let config = self.config.read();
        let Some(agents) = &config.agents else {
            return Ok(FALLBACK_MODEL.to_string());
        };

        let configured = agents
            .entries
            .get(id.as_str())
            .and_then(|entry| entry.get("model"))
            .and_then(serde_yaml::Value::as_str)
            .filter(|model| !model.is_empty());
        if let Some(model) = configured {
            return Ok(model.to_string());
        }

        Ok(agents
            .default_model
            .clone()
            .unwrap_or_else(|| FALLBACK_MODEL.to_string()))
    }

    /// Full settings for an agent
    ///
    /// An agent without an entry gets the defaults. A configured entry
    /// without a model inherits `default_model`.
    pub fn agent_config(&self, agent: impl AsRef<str>) -> ConfigResult<AgentModelConfig> {
        let id: AgentId = agent.as_ref().parse()?;
        let config = self.config.read();
        let Some(agents) = &config.agents else {
            return Ok(AgentModelConfig::default());
        };

        let entry = match agents.entries.get(id.as_str()) {
            None | Some(serde_yaml::Value::Null) => return Ok(AgentModelConfig::default()),
            Some(entry) => entry.clone(),
        };

        let mut parsed: AgentModelConfig = serde_yaml::from_value(entry)
            .map_err(|e| ConfigError::Parse(format!("agents.{}: {}", id, e)))?;
        if parsed.model.is_none() {
            parsed.model = agents.default_model.clone();
        }
        Ok(parsed)
    }

    /// Settings for every known agent, keyed by id
    pub fn all_agent_configs(&self) -> ConfigResult<BTreeMap<String, AgentModelConfig>> {
        AgentId::ALL
            .iter()
            .map(|id| -> ConfigResult<(String, AgentModelConfig)> { Ok((id.to_string(), self.agent_config(id)?)) })
            .collect()
    }

    pub fn mcp_overrides(&self) -> Option<McpOverrides> {
        self.config.read().mcp.clone()
    }
}

impl fmt::Debug for AgentConfigManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfigManager")
            .field("path", &self.path)
            .field("source", &self.source)
            .finish()
    }
}

fn read_config_file(path: &Path) -> ConfigResult<ConfigFile> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    Ok(serde_yaml::from_str(&content)?)
}
