//! Mock session for testing
//!
//! Serves a fixed catalogue and deterministic responses without any
//! network. Every invocation is recorded so tests can assert on exactly
//! what reached the transport.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Map, Value};

use super::error::{SessionError, SessionResult};
use super::traits::{CallOutcome, Session};
use crate::logging::{Logger, NoOpLogger};
use crate::types::ToolDescriptor;

/// How the mock answers a tool call
#[derive(Debug, Clone, Default)]
pub enum MockResponse {
    /// Return `{"tool": name, "arguments": arguments}`
    #[default]
    Echo,
    /// Return a fixed value
    Fixed(Value),
    /// Return a stream yielding these values in order
    Chunks(Vec<Value>),
    /// Fail the call with a tool error
    Error(String),
    /// Stream some chunks, then fail
    StreamError { chunks: Vec<Value>, message: String },
}

/// One invocation as seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub name: String,
    pub arguments: Map<String, Value>,
}

/// Mock session serving a fixed catalogue
pub struct MockSession {
    tools: RwLock<Vec<ToolDescriptor>>,
    responses: RwLock<HashMap<String, MockResponse>>,
    default_response: RwLock<MockResponse>,
    list_failure: RwLock<Option<String>>,
    calls: Mutex<Vec<RecordedCall>>,
    list_calls: AtomicUsize,
    init_calls: AtomicUsize,
    logger: Arc<dyn Logger>,
}

impl MockSession {
    /// Create a mock serving `tools` that echoes every call
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self::with_logger(tools, Arc::new(NoOpLogger::new()))
    }

    /// Create a mock with a logger
    pub fn with_logger(tools: Vec<ToolDescriptor>, logger: Arc<dyn Logger>) -> Self {
        Self {
            tools: RwLock::new(tools),
            responses: RwLock::new(HashMap::new()),
            default_response: RwLock::new(MockResponse::default()),
            list_failure: RwLock::new(None),
            calls: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            init_calls: AtomicUsize::new(0),
            logger,
        }
    }

    /// Answer calls to `tool` with `response`
    pub fn with_response(self, tool: impl Into<String>, response: MockResponse) -> Self {
        self.responses.write().insert(tool.into(), response);
        self
    }

    /// Answer calls to tools without a specific response with `response`
    pub fn with_default_response(self, response: MockResponse) -> Self {
        *self.default_response.write() = response;
        self
    }

    /// Replace the served catalogue
    pub fn set_tools(&self, tools: Vec<ToolDescriptor>) {
        *self.tools.write() = tools;
    }

    /// Make the next `list_tools` calls fail (or succeed again with `None`)
    pub fn fail_listing(&self, message: Option<String>) {
        *self.list_failure.write() = message;
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of catalogue fetches
    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of handshakes
    pub fn init_count(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    fn response_for(&self, name: &str) -> MockResponse {
        self.responses
            .read()
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.default_response.read().clone())
    }
}

#[async_trait]
impl Session for MockSession {
    async fn initialize_session(&self) -> SessionResult<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_tools(&self) -> SessionResult<Vec<ToolDescriptor>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.list_failure.read().clone() {
            return Err(SessionError::Transport(message));
        }
        let tools = self.tools.read().clone();
        self.logger.debug(&format!("[MockSession] Listing {} tools", tools.len()));
        Ok(tools)
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> SessionResult<CallOutcome> {
        self.logger.debug(&format!("[MockSession] call_tool {}", name));
        self.calls.lock().push(RecordedCall {
            name: name.to_string(),
            arguments: arguments.clone(),
        });

        match self.response_for(name) {
            MockResponse::Echo => Ok(CallOutcome::Complete(json!({
                "tool": name,
                "arguments": Value::Object(arguments),
            }))),
            MockResponse::Fixed(value) => Ok(CallOutcome::Complete(value)),
            MockResponse::Chunks(chunks) => Ok(CallOutcome::Stream(Box::pin(stream::iter(
                chunks.into_iter().map(Ok),
            )))),
            MockResponse::Error(message) => Err(SessionError::tool_failed(name, message)),
            MockResponse::StreamError { chunks, message } => {
                let tool = name.to_string();
                let items = chunks
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(SessionError::tool_failed(tool, message))));
                Ok(CallOutcome::Stream(Box::pin(stream::iter(items))))
            }
        }
    }
}
