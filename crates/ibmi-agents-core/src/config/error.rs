//! Configuration errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or querying configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Parse(String),

    #[error("Unknown agent ID: {id}. Valid options: {}", .valid.join(", "))]
    UnknownAgent { id: String, valid: Vec<String> },

    #[error("Configuration error: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
