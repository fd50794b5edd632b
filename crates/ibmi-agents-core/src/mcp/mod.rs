//! MCP (Model Context Protocol) client module
//!
//! Uses the official rmcp SDK to connect to the IBM i MCP server.
//! Supports Streamable HTTP and Unix socket transports.
//!
//! # Example
//!
//! ```rust,ignore
//! use ibmi_agents_core::config::McpSettings;
//! use ibmi_agents_core::mcp::connect_session;
//!
//! let settings = McpSettings::from_env()?;
//! let session = connect_session(&settings, logger.clone()).await?;
//! registrar.set_session(session);
//! ```

mod capture;
mod client;

use std::sync::Arc;

pub use capture::{line_transport, CapturingHttpClient, RawCatalogue};
pub use client::{descriptor_from_value, result_to_value, McpClient, McpError, McpResult};

// Re-export rmcp types that consumers might need
pub use rmcp::model::{CallToolResult as McpToolResult, Tool as McpTool};

use crate::config::{McpSettings, McpTransport};
use crate::logging::Logger;
use crate::session::Session;

/// Connect using the configured transport
pub async fn connect_session(settings: &McpSettings, logger: Arc<dyn Logger>) -> McpResult<Arc<dyn Session>> {
    let client = match settings.transport {
        McpTransport::StreamableHttp => McpClient::connect_http(&settings.url, logger).await?,
        #[cfg(unix)]
        McpTransport::Unix => McpClient::connect_unix(&settings.url, logger).await?,
        #[cfg(not(unix))]
        McpTransport::Unix => {
            return Err(McpError::ConnectionFailed(
                "Unix socket transport is not available on this platform".to_string(),
            ))
        }
    };
    Ok(Arc::new(client))
}
