//! MCP client using the official rmcp SDK
//!
//! Connects to the IBM i MCP server over Streamable HTTP or a Unix socket
//! and serves as a [`Session`] for the registrar.

#[cfg(unix)]
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    model::{CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation, RawContent},
    service::RunningService,
    RoleClient, ServiceExt,
};
use serde_json::{Map, Value};
use thiserror::Error;

#[cfg(unix)]
use tokio::net::UnixStream;

use super::capture::{CapturingHttpClient, RawCatalogue};
use crate::logging::Logger;
use crate::session::{CallOutcome, Session, SessionError, SessionResult};
use crate::types::{AnnotationValue, ToolDescriptor};

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type McpResult<T> = Result<T, McpError>;

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "ibmi-agents-core".to_string(),
            title: Some("IBM i Agents".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

/// MCP client for the IBM i MCP server
pub struct McpClient {
    /// The underlying rmcp running service
    client: RunningService<RoleClient, ClientInfo>,
    /// Raw tool definitions recorded by the transport
    catalogue: RawCatalogue,
    logger: Arc<dyn Logger>,
}

impl McpClient {
    /// Connect to an MCP server over a Unix socket
    #[cfg(unix)]
    pub async fn connect_unix<P: AsRef<Path>>(socket_path: P, logger: Arc<dyn Logger>) -> McpResult<Self> {
        let path = socket_path.as_ref();
        logger.info(&format!("[McpClient] Connecting to Unix socket: {:?}", path));

        let stream = UnixStream::connect(path)
            .await
            .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;

        let catalogue = RawCatalogue::new();
        let (read, write) = stream.into_split();
        let client = client_info()
            .serve(super::capture::line_transport(read, write, catalogue.clone()))
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info("[McpClient] Connected and initialized successfully");
        Ok(Self {
            client,
            catalogue,
            logger,
        })
    }

    /// Connect to an MCP server over HTTP (Streamable HTTP transport)
    pub async fn connect_http(url: &str, logger: Arc<dyn Logger>) -> McpResult<Self> {
        use rmcp::transport::streamable_http_client::{
            StreamableHttpClientTransport, StreamableHttpClientTransportConfig,
        };

        logger.info(&format!("[McpClient] Connecting to HTTP: {}", url));

        let catalogue = RawCatalogue::new();
        let transport = StreamableHttpClientTransport::with_client(
            CapturingHttpClient::new(catalogue.clone()),
            StreamableHttpClientTransportConfig::with_uri(url),
        );
        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info("[McpClient] Connected and initialized successfully");
        Ok(Self {
            client,
            catalogue,
            logger,
        })
    }

    /// Get server info
    pub fn server_info(&self) -> Option<&Implementation> {
        self.client.peer_info().map(|info| &info.server_info)
    }

    /// Close the connection
    pub async fn close(self) -> McpResult<()> {
        self.logger.info("[McpClient] Closing connection");
        self.client
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Session for McpClient {
    async fn initialize_session(&self) -> SessionResult<()> {
        // rmcp completes the handshake while connecting
        match self.server_info() {
            Some(info) => {
                self.logger
                    .debug(&format!("[McpClient] Session ready ({} {})", info.name, info.version));
                Ok(())
            }
            None => Err(SessionError::Initialization(
                "server did not complete the MCP handshake".to_string(),
            )),
        }
    }

    async fn list_tools(&self) -> SessionResult<Vec<ToolDescriptor>> {
        self.catalogue.clear();
        let tools = self
            .client
            .list_all_tools()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        self.logger.info(&format!("[McpClient] Listed {} tools", tools.len()));

        // Prefer the wire payload: rmcp's typed annotations drop custom keys
        tools
            .iter()
            .map(|tool| match self.catalogue.get(&tool.name) {
                Some(raw) => descriptor_from_value(&raw),
                None => descriptor_from_value(&serde_json::to_value(tool)?),
            })
            .collect()
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> SessionResult<CallOutcome> {
        self.logger.info(&format!("[McpClient] Calling tool: {}", name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: Some(arguments),
            task: None,
        };

        let result = self
            .client
            .call_tool(params)
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        result_to_value(name, result).map(CallOutcome::Complete)
    }
}

/// Build a descriptor from a serialized MCP tool
///
/// Every key of `annotations` becomes an annotation, including custom tags
/// such as `toolsets`. Keys found only in `_meta` are used too, with
/// `annotations` winning on conflict. A top-level `title` fills in a
/// missing `title` annotation.
pub fn descriptor_from_value(value: &Value) -> SessionResult<ToolDescriptor> {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| SessionError::Protocol("tool definition without a name".to_string()))?;
    let description = value.get("description").and_then(Value::as_str).unwrap_or_default();
    let schema = value
        .get("inputSchema")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));

    let mut descriptor = ToolDescriptor::new(name, description).with_schema(schema);
    for section in ["_meta", "annotations"] {
        if let Some(Value::Object(entries)) = value.get(section) {
            for (key, raw) in entries {
                let annotation = AnnotationValue::from_json(raw);
                if !annotation.is_absent() {
                    descriptor.annotations.insert(key.clone(), annotation);
                }
            }
        }
    }
    if descriptor.annotation("title").is_absent() {
        if let Some(title) = value.get("title").and_then(Value::as_str) {
            descriptor = descriptor.with_annotation("title", title);
        }
    }

    Ok(descriptor)
}

/// Collapse a call result into one JSON value
///
/// Structured content wins over text. A result flagged as an error becomes
/// [`SessionError::ToolFailed`] carrying the remote text.
pub fn result_to_value(tool: &str, result: CallToolResult) -> SessionResult<Value> {
    let text = result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    if result.is_error.unwrap_or(false) {
        return Err(SessionError::tool_failed(tool, text));
    }
    if let Some(structured) = result.structured_content {
        return Ok(structured);
    }
    if text.is_empty() && !result.content.is_empty() {
        return Ok(serde_json::to_value(&result.content)?);
    }
    Ok(Value::String(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_merges_meta_and_annotations() {
        let descriptor = descriptor_from_value(&json!({
            "name": "system_status",
            "title": "System Status",
            "description": "Overall system performance",
            "inputSchema": {"type": "object", "properties": {"detailed": {"type": "boolean"}}},
            "annotations": {"readOnlyHint": true, "openWorldHint": false},
            "_meta": {"toolsets": ["performance"], "readOnlyHint": false, "owner": {"team": "ops"}}
        }))
        .unwrap();

        assert_eq!(descriptor.name, "system_status");
        assert_eq!(descriptor.toolsets(), vec!["performance"]);
        assert_eq!(descriptor.annotation("readOnlyHint"), &AnnotationValue::Bool(true));
        assert_eq!(descriptor.annotation("title"), &AnnotationValue::String("System Status".to_string()));
        assert_eq!(descriptor.annotation("owner").as_str(), Some(r#"{"team":"ops"}"#));
        assert_eq!(descriptor.input_schema["properties"]["detailed"]["type"], json!("boolean"));
    }

    #[test]
    fn test_custom_annotation_keys_survive_from_wire_payload() {
        let wire = json!({
            "name": "system_status",
            "description": "Overall system performance",
            "inputSchema": {"type": "object", "properties": {}},
            "annotations": {"toolsets": ["performance"], "readOnlyHint": true},
            "_meta": {"toolsets": ["sysadmin_search"], "owner": "ops"}
        });

        let descriptor = descriptor_from_value(&wire).unwrap();
        assert_eq!(descriptor.toolsets(), vec!["performance"]);
        assert_eq!(descriptor.annotation("readOnlyHint"), &AnnotationValue::Bool(true));
        assert_eq!(descriptor.annotation("owner").as_str(), Some("ops"));

        // A typed rmcp round trip drops `annotations.toolsets`
        let typed: rmcp::model::Tool = serde_json::from_value(wire.clone()).unwrap();
        let lossy = descriptor_from_value(&serde_json::to_value(&typed).unwrap()).unwrap();
        assert!(!lossy.toolsets().contains(&"performance".to_string()));

        let catalogue = RawCatalogue::new();
        catalogue.observe(&json!({"jsonrpc": "2.0", "id": 1, "result": {"tools": [wire]}}));
        let recorded = descriptor_from_value(&catalogue.get(&typed.name).unwrap()).unwrap();
        assert_eq!(recorded.toolsets(), vec!["performance"]);
    }

    #[test]
    fn test_descriptor_requires_name() {
        let err = descriptor_from_value(&json!({"description": "nameless"})).unwrap_err();
        assert!(matches!(err, SessionError::Protocol(_)));
    }

    #[test]
    fn test_error_result_becomes_tool_failure() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "SQL0204 - ACTIVE_JOB_INFO not found"}],
            "isError": true
        }))
        .unwrap();

        match result_to_value("active_jobs", result) {
            Err(SessionError::ToolFailed { tool, message }) => {
                assert_eq!(tool, "active_jobs");
                assert!(message.starts_with("SQL0204"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_text_result() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "line 1"}, {"type": "text", "text": "line 2"}]
        }))
        .unwrap();

        assert_eq!(result_to_value("t", result).unwrap(), json!("line 1\nline 2"));
    }
}
