//! Sink backed by any synchronous writer.

use std::io::{self, Stderr, Stdout, Write};
use std::sync::Mutex;

use super::LineSink;
use crate::error::SinkError;

/// Writes each line to a [`Write`] implementation under a mutex.
///
/// The line and its terminator are written with a single `write_all` while
/// the lock is held, then the writer is flushed.
pub struct WriterSink<W> {
    inner: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }

    /// Consumes the sink and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.inner.into_inner().map_err(|_| SinkError::Poisoned)
    }
}

impl WriterSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl WriterSink<Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> LineSink for WriterSink<W> {
    fn append_line(&self, line: &str) -> Result<(), SinkError> {
        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');

        let mut writer = self.inner.lock().map_err(|_| SinkError::Poisoned)?;
        writer.write_all(record.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}
