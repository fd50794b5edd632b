//! Agent identifiers
//!
//! The kebab-case ids double as agent ids at runtime and as keys under
//! `agents:` in the config file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentId {
    #[serde(rename = "ibmi-performance-monitor")]
    PerformanceMonitor,
    #[serde(rename = "ibmi-sysadmin-discovery")]
    SysadminDiscovery,
    #[serde(rename = "ibmi-sysadmin-browse")]
    SysadminBrowse,
    #[serde(rename = "ibmi-sysadmin-search")]
    SysadminSearch,
}

impl AgentId {
    pub const ALL: [AgentId; 4] = [
        AgentId::PerformanceMonitor,
        AgentId::SysadminDiscovery,
        AgentId::SysadminBrowse,
        AgentId::SysadminSearch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::PerformanceMonitor => "ibmi-performance-monitor",
            AgentId::SysadminDiscovery => "ibmi-sysadmin-discovery",
            AgentId::SysadminBrowse => "ibmi-sysadmin-browse",
            AgentId::SysadminSearch => "ibmi-sysadmin-search",
        }
    }

    pub fn all_ids() -> Vec<&'static str> {
        Self::ALL.iter().map(AgentId::as_str).collect()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for AgentId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownAgent {
                id: s.to_string(),
                valid: Self::all_ids().into_iter().map(String::from).collect(),
            })
    }
}
