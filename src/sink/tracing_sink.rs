//! Sink that hands lines to the active `tracing` subscriber.

use super::LineSink;
use crate::error::SinkError;

/// Target used for access log events, so they can be filtered with
/// `RUST_LOG=access_log=info`.
pub const ACCESS_LOG_TARGET: &str = "access_log";

/// Emits each line as an `INFO` event on the [`ACCESS_LOG_TARGET`] target.
///
/// Atomicity is whatever the installed subscriber provides; the default
/// `fmt` subscriber writes each event with one call.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LineSink for TracingSink {
    fn append_line(&self, line: &str) -> Result<(), SinkError> {
        tracing::info!(target: ACCESS_LOG_TARGET, "{line}");
        Ok(())
    }
}
