//! Agent definitions: persona, model settings and filtered tools

use std::sync::Arc;

use super::ids::AgentId;
use super::profile::{profile, AgentProfile};
use crate::config::{AgentConfigManager, ConfigResult, ToolsetConfig, FALLBACK_MODEL};
use crate::logging::Logger;
use crate::session::Session;
use crate::tools::{presets, FilterSpec, RegistrarOptions, ToolError, ToolRegistrar, ToolResult};

/// Model settings for one agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    /// `provider:model_id`
    pub model: String,
    pub debug_mode: bool,
    pub enable_reasoning: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: FALLBACK_MODEL.to_string(),
            debug_mode: false,
            enable_reasoning: true,
        }
    }
}

/// Overlay configured values on `settings`
///
/// Without a manager the settings are returned unchanged. Values missing
/// from the config keep what the caller passed.
pub fn apply_agent_config(
    id: AgentId,
    manager: Option<&AgentConfigManager>,
    settings: AgentSettings,
) -> ConfigResult<AgentSettings> {
    let Some(manager) = manager else {
        return Ok(settings);
    };
    let config = manager.agent_config(id)?;

    Ok(AgentSettings {
        model: config.model.filter(|m| !m.is_empty()).unwrap_or(settings.model),
        debug_mode: config.debug_mode.unwrap_or(settings.debug_mode),
        enable_reasoning: config.enable_reasoning.unwrap_or(settings.enable_reasoning),
    })
}

/// Everything needed to stand up one agent
#[derive(Debug, Clone)]
pub struct AgentDefinition {
    pub profile: &'static AgentProfile,
    pub settings: AgentSettings,
    /// Tool selection from the config file, replacing the built-in toolset
    pub toolset: Option<ToolsetConfig>,
    pub debug_filtering: bool,
}

impl AgentDefinition {
    /// Built-in defaults for `id`
    pub fn new(id: AgentId) -> Self {
        Self {
            profile: profile(id),
            settings: AgentSettings::default(),
            toolset: None,
            debug_filtering: false,
        }
    }

    /// Defaults overlaid with the agent's entry in the config file
    pub fn from_config(id: AgentId, manager: Option<&AgentConfigManager>) -> ConfigResult<Self> {
        let mut definition = Self::new(id);
        definition.settings = apply_agent_config(id, manager, definition.settings)?;
        if let Some(manager) = manager {
            definition.toolset = manager.agent_config(id)?.toolset;
        }
        Ok(definition)
    }

    pub fn with_debug_filtering(mut self, debug: bool) -> Self {
        self.debug_filtering = debug;
        self
    }

    pub fn id(&self) -> AgentId {
        self.profile.id
    }

    pub fn name(&self) -> &'static str {
        self.profile.name
    }

    /// How this agent's tools are selected
    pub fn registrar_options(&self) -> ConfigResult<RegistrarOptions> {
        let options = match &self.toolset {
            Some(toolset) => toolset.to_options(self.id().as_str())?,
            None => presets::annotation_filtered(FilterSpec::toolsets([self.profile.toolset]))
                .with_name(self.id().as_str()),
        };
        let debug = options.debug_filtering || self.debug_filtering;
        Ok(options.with_debug_filtering(debug))
    }

    /// A registrar for this agent's tools, bound to `session`
    ///
    /// The registrar still needs [`ToolRegistrar::initialize`].
    pub fn build_registrar(&self, session: Arc<dyn Session>, logger: Arc<dyn Logger>) -> ToolResult<ToolRegistrar> {
        let options = self
            .registrar_options()
            .map_err(|e| ToolError::Configuration(e.to_string()))?;
        let registrar = ToolRegistrar::new(options, logger)?;
        registrar.set_session(session);
        Ok(registrar)
    }
}

/// Definitions for every known agent
pub fn all_definitions(manager: Option<&AgentConfigManager>) -> ConfigResult<Vec<AgentDefinition>> {
    AgentId::ALL
        .iter()
        .map(|id| AgentDefinition::from_config(*id, manager))
        .collect()
}
