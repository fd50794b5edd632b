//! Logging abstractions for runtime-agnostic logging
//!
//! Components take an `Arc<dyn Logger>` so the host process decides where
//! diagnostics go (console, an agent framework's log, or nowhere in tests).

mod traits;
mod noop;
mod console;
mod memory;

pub use traits::Logger;
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use memory::{MemoryLogger, LogLine};
