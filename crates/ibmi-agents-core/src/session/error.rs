//! Session error types

use thiserror::Error;

/// Errors raised by a session while listing or invoking tools
#[derive(Error, Debug)]
pub enum SessionError {
    /// The session handshake did not complete
    #[error("Session initialization failed: {0}")]
    Initialization(String),

    /// Transport level failure (connection dropped, timeout, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote tool ran and reported an error
    #[error("Tool '{tool}' failed: {message}")]
    ToolFailed { tool: String, message: String },

    /// Malformed or unexpected protocol message
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// JSON conversion error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// Create a tool failure
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
