//! Logger trait and formatting macros

/// Logger abstraction for runtime-agnostic logging
///
/// Implementations:
/// - `NoOpLogger`: Silent logger for testing
/// - `ConsoleLogger`: Logs to stdout/stderr
/// - `MemoryLogger`: Captures lines so tests can assert on diagnostics
pub trait Logger: Send + Sync {
    /// Log a debug message
    fn debug(&self, message: &str);

    /// Log an info message
    fn info(&self, message: &str);

    /// Log a warning message
    fn warn(&self, message: &str);

    /// Log an error message
    fn error(&self, message: &str);
}

/// `format!`-style logging against any `Logger` expression,
/// e.g. `crate::log_warn!(self.logger, "[ToolRegistrar] {}", e)`.
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(&format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::Logger;
    use crate::logging::MemoryLogger;

    #[test]
    fn test_macros_format_and_route_by_level() {
        let logger = MemoryLogger::new();
        crate::log_debug!(logger, "{} discovered {} tools", "mcp-tools", 3);
        crate::log_error!(logger, "failed: {}", "boom");

        assert!(logger.contains("debug", "mcp-tools discovered 3 tools"));
        assert!(logger.contains("error", "failed: boom"));
        assert!(!logger.contains("info", "boom"));
    }
}
