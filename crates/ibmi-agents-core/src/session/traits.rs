//! Session trait definition

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde_json::{Map, Value};

use super::error::SessionResult;
use crate::types::ToolDescriptor;

/// Chunked result of a tool invocation
pub type ResultStream = Pin<Box<dyn Stream<Item = SessionResult<Value>> + Send>>;

/// What a remote tool invocation produced
pub enum CallOutcome {
    /// A single materialized result
    Complete(Value),
    /// A live sequence of partial results
    Stream(ResultStream),
}

impl std::fmt::Debug for CallOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallOutcome::Complete(value) => f.debug_tuple("Complete").field(value).finish(),
            CallOutcome::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Remote tool transport as seen by the registrar
///
/// The protocol is exclusively `(name, argument mapping) -> result`; no
/// caller identity ever crosses this boundary. Timeouts and cancellation
/// belong to the implementation.
#[async_trait]
pub trait Session: Send + Sync {
    /// Complete the protocol handshake (idempotent)
    async fn initialize_session(&self) -> SessionResult<()>;

    /// Fetch the full tool catalogue in discovery order
    async fn list_tools(&self) -> SessionResult<Vec<ToolDescriptor>>;

    /// Invoke one tool
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> SessionResult<CallOutcome>;
}
