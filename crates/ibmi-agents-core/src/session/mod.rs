//! Session abstraction over the remote tool transport
//!
//! The registrar never talks to MCP directly. It needs three things from a
//! session: a handshake, the tool catalogue and a way to invoke one tool.
//! `McpClient` implements this over the official SDK; `MockSession` is a
//! deterministic in-process stand-in.

mod error;
mod traits;
mod mock;

pub use error::{SessionError, SessionResult};
pub use traits::{CallOutcome, ResultStream, Session};
pub use mock::{MockResponse, MockSession, RecordedCall};
