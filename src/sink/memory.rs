use std::sync::Mutex;

use super::LineSink;
use crate::error::SinkError;

/// Collects lines in memory. Used by tests and examples.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every line appended so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl LineSink for MemorySink {
    fn append_line(&self, line: &str) -> Result<(), SinkError> {
        self.lines
            .lock()
            .map_err(|_| SinkError::Poisoned)?
            .push(line.to_string());
        Ok(())
    }
}
