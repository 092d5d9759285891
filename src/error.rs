//! Error types for access log sinks.

use std::io;

/// Errors that can occur while appending a line to a [`LineSink`](crate::sink::LineSink).
///
/// These never reach the HTTP client. A [`LogEntry`](crate::logger::LogEntry)
/// that receives one logs it and drops the line.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to write access log line: {0}")]
    Io(#[from] io::Error),

    #[error("Access log queue is full, line dropped")]
    QueueFull,

    #[error("Access log queue is closed")]
    Closed,

    #[error("Access log writer lock poisoned")]
    Poisoned,
}
