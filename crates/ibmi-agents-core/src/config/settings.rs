//! Settings read from the process environment

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::logging::{ConsoleLogger, Logger};

pub const DEFAULT_MCP_URL: &str = "http://127.0.0.1:3010/mcp";
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

/// How to reach the MCP server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum McpTransport {
    /// Streamable HTTP at `url`
    #[default]
    StreamableHttp,
    /// Unix domain socket; `url` is the socket path
    Unix,
}

impl McpTransport {
    pub fn as_str(&self) -> &'static str {
        match self {
            McpTransport::StreamableHttp => "streamable-http",
            McpTransport::Unix => "unix",
        }
    }
}

impl fmt::Display for McpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for McpTransport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "streamable-http" | "streamable_http" | "http" => Ok(McpTransport::StreamableHttp),
            "unix" => Ok(McpTransport::Unix),
            other => Err(ConfigError::Invalid(format!(
                "unsupported MCP transport '{}' (expected streamable-http or unix)",
                other
            ))),
        }
    }
}

/// MCP server location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpSettings {
    pub url: String,
    pub transport: McpTransport,
}

impl Default for McpSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_MCP_URL.to_string(),
            transport: McpTransport::default(),
        }
    }
}

impl McpSettings {
    /// `MCP_URL` and `MCP_TRANSPORT`
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let transport = match lookup("MCP_TRANSPORT") {
            Some(raw) => raw.parse()?,
            None => defaults.transport,
        };
        Ok(Self {
            url: lookup("MCP_URL").unwrap_or(defaults.url),
            transport,
        })
    }

    /// Apply values from the `mcp` section of a config file
    pub fn with_overrides(mut self, overrides: &McpOverrides) -> Self {
        if let Some(url) = &overrides.url {
            self.url = url.clone();
        }
        if let Some(transport) = overrides.transport {
            self.transport = transport;
        }
        self
    }
}

/// Optional `mcp:` section of the agent config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpOverrides {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub transport: Option<McpTransport>,
}

/// Process-wide settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub mcp: McpSettings,
    pub debug: bool,
    /// Upper-cased level name
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            mcp: McpSettings::default(),
            debug: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppSettings {
    /// `DEBUG`, `LOG_LEVEL` and the MCP variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let debug = lookup("DEBUG")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);
        let log_level = lookup("LOG_LEVEL")
            .map(|v| v.to_uppercase())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            mcp: McpSettings::from_lookup(&lookup)?,
            debug,
            log_level,
        })
    }

    /// Whether debug lines should be printed
    pub fn verbose(&self) -> bool {
        self.debug || self.log_level == "DEBUG"
    }

    /// Console logger honoring `DEBUG`/`LOG_LEVEL`
    pub fn logger(&self) -> Arc<dyn Logger> {
        Arc::new(ConsoleLogger::new().verbose(self.verbose()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_mcp_defaults() {
        let settings = McpSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.url, "http://127.0.0.1:3010/mcp");
        assert_eq!(settings.transport, McpTransport::StreamableHttp);
    }

    #[test]
    fn test_mcp_from_vars() {
        let settings = McpSettings::from_lookup(lookup(&[
            ("MCP_URL", "/tmp/ibmi-mcp.sock"),
            ("MCP_TRANSPORT", "unix"),
        ]))
        .unwrap();
        assert_eq!(settings.url, "/tmp/ibmi-mcp.sock");
        assert_eq!(settings.transport, McpTransport::Unix);

        let err = McpSettings::from_lookup(lookup(&[("MCP_TRANSPORT", "sse")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_overrides() {
        let settings = McpSettings::default().with_overrides(&McpOverrides {
            url: Some("http://ibmi.example.com:3010/mcp".to_string()),
            transport: None,
        });
        assert_eq!(settings.url, "http://ibmi.example.com:3010/mcp");
        assert_eq!(settings.transport, McpTransport::StreamableHttp);
    }

    #[test]
    fn test_app_settings() {
        let settings = AppSettings::from_lookup(lookup(&[("DEBUG", "Yes"), ("LOG_LEVEL", "warning")])).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.log_level, "WARNING");
        assert!(settings.verbose());

        let quiet = AppSettings::from_lookup(lookup(&[("DEBUG", "off")])).unwrap();
        assert!(!quiet.debug);
        assert_eq!(quiet.log_level, "INFO");
        assert!(!quiet.verbose());
    }
}
