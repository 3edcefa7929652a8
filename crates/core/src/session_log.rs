//! Operator-facing diagnostic log.
//!
//! Entries are plain strings, appended in order and never removed. This is
//! what the operator sees at the end of a command; `tracing` output is for
//! developers.

use chrono::{DateTime, Utc};

/// A single log line with the time it was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub recorded_at: DateTime<Utc>,
    pub message: String,
}

/// Append-only, ordered list of diagnostic messages.
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    entries: Vec<LogEntry>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push(LogEntry {
            recorded_at: Utc::now(),
            message: message.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.message.as_str())
    }

    /// All messages joined by newlines.
    pub fn render(&self) -> String {
        self.messages().collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order() {
        let mut log = SessionLog::new();
        log.push("first");
        log.push(String::from("second"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.render(), "first\nsecond");
        assert!(log.entries()[0].recorded_at <= log.entries()[1].recorded_at);
    }
}
