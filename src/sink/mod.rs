//! Line-oriented destinations for access log records.
//!
//! Every sink implements [`LineSink`], whose single operation appends one
//! complete line. Implementations guarantee that a single call is atomic
//! with respect to concurrent calls, so lines from parallel requests are
//! never interleaved.
//!
//! # Implementations
//!
//! - [`WriterSink`] - Mutex-guarded [`std::io::Write`] (stdout, stderr, files)
//! - [`ChannelSink`] - Bounded queue drained by a background file writer
//! - [`TracingSink`] - Forwards lines as `tracing` events
//! - [`MemorySink`] - In-memory collector for tests

pub mod channel;
pub mod memory;
pub mod tracing_sink;
pub mod writer;

pub use channel::{ChannelSink, open_log_file, run_sink_worker};
pub use memory::MemorySink;
pub use tracing_sink::TracingSink;
pub use writer::WriterSink;

use crate::error::SinkError;

/// A destination that records complete log lines.
///
/// `line` never contains the terminator; the sink adds it.
pub trait LineSink: Send + Sync {
    /// Appends one line atomically.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the line could not be recorded.
    fn append_line(&self, line: &str) -> Result<(), SinkError>;
}
