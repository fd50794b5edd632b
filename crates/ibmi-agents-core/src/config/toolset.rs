//! Declarative tool-set selection, as written in YAML
//!
//! ```yaml
//! toolset:
//!   annotation_filters:
//!     toolsets: [performance]
//!     readOnlyHint: true
//!     title: { contains: system }
//!   exclude_tools: [restart_subsystem]
//!   on_collision: error
//!   coercion: strict
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::tools::{CoercionMode, CollisionPolicy, FilterRule, FilterSpec, RegistrarOptions, ToolFilterOptions, Toolsets};
use crate::types::Scalar;

/// Object form of a rule; exactly one field must be set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchRule {
    /// Case-insensitive substring of a string annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    /// Annotation present (`true`) or absent (`false`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present: Option<bool>,
}

/// One annotation rule in configuration form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleConfig {
    Scalar(Scalar),
    List(Vec<Scalar>),
    Match(MatchRule),
}

impl RuleConfig {
    pub fn to_rule(&self) -> ConfigResult<FilterRule> {
        match self {
            RuleConfig::Scalar(value) => Ok(FilterRule::Equals(value.clone())),
            RuleConfig::List(values) => Ok(FilterRule::AnyOf(values.clone())),
            RuleConfig::Match(MatchRule {
                contains: Some(needle),
                present: None,
            }) => Ok(FilterRule::contains_text(needle.clone())),
            RuleConfig::Match(MatchRule {
                contains: None,
                present: Some(expected),
            }) => Ok(FilterRule::present(*expected)),
            RuleConfig::Match(_) => Err(ConfigError::Invalid(
                "a rule object needs exactly one of 'contains' or 'present'".to_string(),
            )),
        }
    }
}

/// Tool selection for one registrar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsetConfig {
    pub name: Option<String>,
    pub annotation_filters: Option<BTreeMap<String, RuleConfig>>,
    /// Legacy form of `annotation_filters: { toolsets: [...] }`
    pub toolsets: Option<Toolsets>,
    pub include_tools: Option<Vec<String>>,
    pub exclude_tools: Vec<String>,
    pub on_collision: CollisionPolicy,
    pub coercion: CoercionMode,
    pub debug_filtering: bool,
}

impl ToolsetConfig {
    /// Annotation rules, if any were configured
    pub fn filter_spec(&self) -> ConfigResult<Option<FilterSpec>> {
        let Some(filters) = &self.annotation_filters else {
            return Ok(None);
        };
        let mut spec = FilterSpec::new();
        for (key, rule) in filters {
            let rule = rule
                .to_rule()
                .map_err(|e| ConfigError::Invalid(format!("annotation_filters.{}: {}", key, e)))?;
            spec.insert(key.clone(), rule);
        }
        Ok(Some(spec))
    }

    /// Registrar options; `default_name` is used when `name` is unset
    pub fn to_options(&self, default_name: &str) -> ConfigResult<RegistrarOptions> {
        if self.annotation_filters.is_some() && self.toolsets.is_some() {
            return Err(ConfigError::Invalid(
                "cannot specify both 'toolsets' and 'annotation_filters'".to_string(),
            ));
        }

        let mut filter = ToolFilterOptions::new();
        if let Some(spec) = self.filter_spec()? {
            filter = filter.with_annotation_filters(spec);
        }
        if let Some(toolsets) = &self.toolsets {
            filter = filter.with_toolsets(toolsets.clone());
        }

        Ok(RegistrarOptions {
            name: self.name.clone().unwrap_or_else(|| default_name.to_string()),
            filter,
            include_tools: self.include_tools.clone(),
            exclude_tools: self.exclude_tools.clone(),
            on_collision: self.on_collision,
            coercion: self.coercion,
            debug_filtering: self.debug_filtering,
        })
    }
}
