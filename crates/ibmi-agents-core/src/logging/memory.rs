//! In-memory logger that records every line

use parking_lot::Mutex;

use super::traits::Logger;

/// A single captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: &'static str,
    pub message: String,
}

/// Logger that keeps everything it is given, for assertions in tests
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<LogLine>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured lines
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().clone()
    }

    /// Whether any line at `level` contains `needle`
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.lines
            .lock()
            .iter()
            .any(|l| l.level == level && l.message.contains(needle))
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    fn push(&self, level: &'static str, message: &str) {
        self.lines.lock().push(LogLine {
            level,
            message: message.to_string(),
        });
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push("debug", message);
    }

    fn info(&self, message: &str) {
        self.push("info", message);
    }

    fn warn(&self, message: &str) {
        self.push("warn", message);
    }

    fn error(&self, message: &str) {
        self.push("error", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger_captures() {
        let logger = MemoryLogger::new();
        logger.info("hello");
        crate::log_warn!(logger, "tool {} skipped", "b");

        assert_eq!(logger.lines().len(), 2);
        assert!(logger.contains("warn", "tool b skipped"));
        assert!(!logger.contains("error", "hello"));

        logger.clear();
        assert!(logger.lines().is_empty());
    }
}
