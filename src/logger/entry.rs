use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::escape::escape;
use super::factory::push_field;
use crate::sink::LineSink;

/// Per-request log record, created by [`LoggerFactory::new_entry`](super::LoggerFactory::new_entry).
///
/// Holds the request-time fields until one of the terminal methods,
/// [`complete`](Self::complete) or [`panic`](Self::panic), consumes the
/// entry and writes exactly one line. Dropping an entry without calling
/// either writes nothing.
pub struct LogEntry {
    sink: Arc<dyn LineSink>,
    timestamp: Option<String>,
    fields: String,
    panic_context: bool,
}

impl LogEntry {
    pub(crate) fn new(
        sink: Arc<dyn LineSink>,
        timestamp: Option<String>,
        fields: String,
        panic_context: bool,
    ) -> Self {
        Self {
            sink,
            timestamp,
            fields,
            panic_context,
        }
    }

    /// Request-time fields captured so far, each followed by a tab.
    pub fn request_fields(&self) -> &str {
        &self.fields
    }

    /// Records the response and writes the access line.
    ///
    /// Appends `status:<code>`, `bytes:<count>` and `time-taken:<seconds>`,
    /// where seconds is `elapsed` as a decimal (`0.0034`, `1.5`, `0`).
    pub fn complete(self, status: u16, bytes: u64, elapsed: Duration) {
        let mut line = self.line_prefix();
        line.push_str(&self.fields);
        push_field(&mut line, "status", &status.to_string());
        push_field(&mut line, "bytes", &bytes.to_string());
        line.push_str("time-taken:");
        line.push_str(&elapsed.as_secs_f64().to_string());

        self.flush(&line);
    }

    /// Writes an error line for a panic that escaped the request handler.
    ///
    /// # Format
    ///
    /// ```text
    /// [<request fields>]level:ERROR\tmessage:<value>\tstack:<stack>
    /// ```
    ///
    /// `value` and `stack` are escaped so the record stays on one line.
    /// The stack is decoded as UTF-8, replacing invalid sequences.
    /// Request fields are omitted when the factory disabled panic context.
    pub fn panic(self, value: impl fmt::Display, stack: &[u8]) {
        let mut line = self.line_prefix();
        if self.panic_context {
            line.push_str(&self.fields);
        }
        push_field(&mut line, "level", "ERROR");
        push_field(&mut line, "message", &escape(&value.to_string()));
        line.push_str("stack:");
        line.push_str(&escape(&String::from_utf8_lossy(stack)));

        self.flush(&line);
    }

    fn line_prefix(&self) -> String {
        let mut line = String::with_capacity(self.fields.len() + 64);
        if let Some(ts) = &self.timestamp {
            push_field(&mut line, "time", ts);
        }
        line
    }

    fn flush(&self, line: &str) {
        if let Err(e) = self.sink.append_line(line) {
            tracing::warn!(error = %e, "Dropped access log line");
        }
    }
}

impl fmt::Debug for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEntry")
            .field("timestamp", &self.timestamp)
            .field("fields", &self.fields)
            .field("panic_context", &self.panic_context)
            .finish_non_exhaustive()
    }
}
