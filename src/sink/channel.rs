//! Queue-backed sink with a single background writer.
//!
//! Request handlers only enqueue; one task owns the file and performs all
//! writes, so appends never contend on file I/O and never interleave.

use std::path::Path;

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, error::TrySendError};

use super::LineSink;
use crate::error::SinkError;

/// Sending half of the access log queue.
///
/// Appends never block: when the queue is full the line is rejected with
/// [`SinkError::QueueFull`].
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<String>,
}

impl ChannelSink {
    /// Creates a sink with a bounded queue of `capacity` lines and returns
    /// the receiver to hand to [`run_sink_worker`].
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Free slots currently available in the queue.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// True once the worker has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl LineSink for ChannelSink {
    fn append_line(&self, line: &str) -> Result<(), SinkError> {
        self.tx.try_send(line.to_string()).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::QueueFull,
            TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

/// Opens `path` for appending, creating it and its parent directories.
pub async fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    OpenOptions::new().create(true).append(true).open(path).await
}

/// Drains the queue into `writer` until every [`ChannelSink`] is dropped.
///
/// The writer is flushed whenever the queue runs empty. Write failures are
/// logged and the line is lost. Returns the writer once the queue closes.
pub async fn run_sink_worker<W>(mut rx: mpsc::Receiver<String>, mut writer: W) -> W
where
    W: AsyncWrite + Unpin,
{
    while let Some(mut line) = rx.recv().await {
        line.push('\n');
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            tracing::error!(error = %e, "Failed to write access log line");
            continue;
        }

        if rx.is_empty()
            && let Err(e) = writer.flush().await
        {
            tracing::error!(error = %e, "Failed to flush access log");
        }
    }

    if let Err(e) = writer.flush().await {
        tracing::error!(error = %e, "Failed to flush access log");
    }
    tracing::debug!("Access log worker stopped");

    writer
}
