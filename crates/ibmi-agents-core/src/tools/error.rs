//! Tool filtering and registration errors

use thiserror::Error;

use super::coerce::CoercionWarning;
use crate::session::SessionError;

/// Errors raised while building or invoking a filtered tool set
#[derive(Error, Debug)]
pub enum ToolError {
    /// No active session when initialization was requested
    #[error("Connection error: {0}")]
    Connection(String),

    /// Conflicting or malformed filter configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The session could not produce a catalogue
    #[error("Tool discovery failed: {0}")]
    Discovery(#[source] SessionError),

    /// A single tool could not be turned into an action
    #[error("Failed to register tool '{tool}': {message}")]
    Registration { tool: String, message: String },

    /// Two accepted tools share a name under the error-on-collision policy
    #[error("Duplicate tool name in catalogue: {0}")]
    DuplicateTool(String),

    /// The remote call failed; carried through untouched
    #[error(transparent)]
    RemoteInvocation(#[from] SessionError),

    /// Strict coercion rejected the call before it reached the session
    #[error("Could not coerce {count} argument(s) for '{tool}'", count = .warnings.len())]
    Coercion {
        tool: String,
        warnings: Vec<CoercionWarning>,
    },

    /// Operation not allowed in the registrar's current state
    #[error("Invalid registrar state: {0}")]
    InvalidState(String),

    /// No action is registered under this name
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The call's arguments are not a mapping
    #[error("Invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },
}

impl ToolError {
    /// Create a registration error
    pub fn registration(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registration {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Whether this is a failure of the remote tool call itself
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteInvocation(_))
    }
}

pub type ToolResult<T> = Result<T, ToolError>;
