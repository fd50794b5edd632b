//! Raw `tools/list` capture
//!
//! rmcp decodes tool annotations into `ToolAnnotations`, which only knows
//! the standard hints. The IBM i server publishes `toolsets` (and any other
//! custom key) inside `annotations`, so both transports here record every
//! tool definition as raw JSON before rmcp sees it. `McpClient::list_tools`
//! then builds descriptors from the recorded payloads.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use futures::{stream::BoxStream, Sink, StreamExt};
use parking_lot::Mutex;
use reqwest::header::{ACCEPT, CONTENT_TYPE, WWW_AUTHENTICATE};
use rmcp::{
    model::{ClientJsonRpcMessage, ServerJsonRpcMessage},
    transport::{
        common::http_header::{EVENT_STREAM_MIME_TYPE, HEADER_SESSION_ID, JSON_MIME_TYPE},
        sink_stream::SinkStreamTransport,
        streamable_http_client::{
            AuthRequiredError, SseError, StreamableHttpClient, StreamableHttpError, StreamableHttpPostResponse,
        },
    },
};
use serde_json::Value;
use sse_stream::{Sse, SseStream};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Tool definitions seen on the wire, keyed by tool name
#[derive(Debug, Clone, Default)]
pub struct RawCatalogue {
    tools: Arc<Mutex<HashMap<String, Value>>>,
}

impl RawCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the tools carried by a JSON-RPC message or batch
    pub fn observe(&self, message: &Value) {
        match message {
            Value::Array(batch) => batch.iter().for_each(|m| self.observe(m)),
            Value::Object(_) => {
                if let Some(Value::Array(tools)) = message.pointer("/result/tools") {
                    let mut recorded = self.tools.lock();
                    for tool in tools {
                        if let Some(name) = tool.get("name").and_then(Value::as_str) {
                            recorded.insert(name.to_owned(), tool.clone());
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Like [`observe`](Self::observe) for unparsed text; non-JSON is ignored
    pub fn observe_text(&self, text: &str) {
        if let Ok(message) = serde_json::from_str::<Value>(text) {
            self.observe(&message);
        }
    }

    /// Parse one server message, recording any tools it carries
    pub fn decode(&self, text: &str) -> serde_json::Result<ServerJsonRpcMessage> {
        let message: Value = serde_json::from_str(text)?;
        self.observe(&message);
        serde_json::from_value(message)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.tools.lock().get(name).cloned()
    }

    pub fn clear(&self) {
        self.tools.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.tools.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.lock().is_empty()
    }
}

fn observe_events(
    events: BoxStream<'static, Result<Sse, SseError>>,
    catalogue: RawCatalogue,
) -> BoxStream<'static, Result<Sse, SseError>> {
    events
        .map(move |event| {
            if let Ok(Sse { data: Some(data), .. }) = &event {
                catalogue.observe_text(data);
            }
            event
        })
        .boxed()
}

/// Streamable HTTP client that records tool definitions
///
/// Requests are sent the same way rmcp's reqwest client sends them; JSON
/// bodies and SSE event payloads are observed before being handed back.
#[derive(Debug, Clone)]
pub struct CapturingHttpClient {
    http: reqwest::Client,
    catalogue: RawCatalogue,
}

impl CapturingHttpClient {
    pub fn new(catalogue: RawCatalogue) -> Self {
        Self {
            http: reqwest::Client::new(),
            catalogue,
        }
    }
}

impl StreamableHttpClient for CapturingHttpClient {
    type Error = reqwest::Error;

    async fn post_message(
        &self,
        uri: Arc<str>,
        message: ClientJsonRpcMessage,
        session_id: Option<Arc<str>>,
        auth_header: Option<String>,
    ) -> Result<StreamableHttpPostResponse, StreamableHttpError<Self::Error>> {
        let mut request = self
            .http
            .post(uri.as_ref())
            .header(ACCEPT, [EVENT_STREAM_MIME_TYPE, JSON_MIME_TYPE].join(", "));
        if let Some(token) = auth_header {
            request = request.bearer_auth(token);
        }
        if let Some(session_id) = session_id {
            request = request.header(HEADER_SESSION_ID, session_id.as_ref());
        }

        let response = request.json(&message).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            if let Some(header) = response.headers().get(WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()) {
                return Err(StreamableHttpError::AuthRequired(AuthRequiredError {
                    www_authenticate_header: header.to_owned(),
                }));
            }
        }
        if matches!(status, reqwest::StatusCode::ACCEPTED | reqwest::StatusCode::NO_CONTENT) {
            return Ok(StreamableHttpPostResponse::Accepted);
        }

        let session_id = response
            .headers()
            .get(HEADER_SESSION_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|ct| String::from_utf8_lossy(ct.as_bytes()).into_owned());

        match content_type.as_deref() {
            Some(ct) if ct.starts_with(EVENT_STREAM_MIME_TYPE) => {
                let events = SseStream::from_bytes_stream(response.bytes_stream()).boxed();
                Ok(StreamableHttpPostResponse::Sse(
                    observe_events(events, self.catalogue.clone()),
                    session_id,
                ))
            }
            Some(ct) if ct.starts_with(JSON_MIME_TYPE) => {
                let body = response.text().await?;
                let message = self.catalogue.decode(&body)?;
                Ok(StreamableHttpPostResponse::Json(message, session_id))
            }
            _ => Err(StreamableHttpError::UnexpectedContentType(content_type)),
        }
    }

    async fn delete_session(
        &self,
        uri: Arc<str>,
        session_id: Arc<str>,
        auth_header: Option<String>,
    ) -> Result<(), StreamableHttpError<Self::Error>> {
        StreamableHttpClient::delete_session(&self.http, uri, session_id, auth_header).await
    }

    async fn get_stream(
        &self,
        uri: Arc<str>,
        session_id: Arc<str>,
        last_event_id: Option<String>,
        auth_header: Option<String>,
    ) -> Result<BoxStream<'static, Result<Sse, SseError>>, StreamableHttpError<Self::Error>> {
        let events = StreamableHttpClient::get_stream(&self.http, uri, session_id, last_event_id, auth_header).await?;
        Ok(observe_events(events, self.catalogue.clone()))
    }
}

pub type LineSink = Pin<Box<dyn Sink<ClientJsonRpcMessage, Error = std::io::Error> + Send>>;
pub type LineTransport = SinkStreamTransport<LineSink, BoxStream<'static, ServerJsonRpcMessage>>;

/// Newline-delimited JSON-RPC over a byte stream (Unix sockets)
pub fn line_transport<R, W>(read: R, write: W, catalogue: RawCatalogue) -> LineTransport
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    SinkStreamTransport::new(outgoing_lines(write), incoming_lines(read, catalogue))
}

fn outgoing_lines<W>(write: W) -> LineSink
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    Box::pin(futures::sink::unfold(write, |mut write: W, message: ClientJsonRpcMessage| async move {
        let mut line = serde_json::to_vec(&message)?;
        line.push(b'\n');
        write.write_all(&line).await?;
        write.flush().await?;
        Ok::<_, std::io::Error>(write)
    }))
}

fn incoming_lines<R>(read: R, catalogue: RawCatalogue) -> BoxStream<'static, ServerJsonRpcMessage>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    futures::stream::unfold(BufReader::new(read).lines(), move |mut lines| {
        let catalogue = catalogue.clone();
        async move {
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => continue,
                    // Undecodable lines are skipped
                    Ok(Some(line)) => match catalogue.decode(&line) {
                        Ok(message) => return Some((message, lines)),
                        Err(_) => continue,
                    },
                    Ok(None) | Err(_) => return None,
                }
            }
        }
    })
    .boxed()
}
