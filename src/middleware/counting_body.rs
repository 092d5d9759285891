//! Response body wrapper that finalizes the access log entry.

use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::thread;
use std::time::Instant;

use axum::body::Body;
use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};

use super::panic::{panic_message, take_stack};
use crate::logger::LogEntry;

/// Logged when the body is dropped during an unwind it did not observe.
const DROPPED_WHILE_PANICKING: &str = "panic while sending response body";

/// Counts data bytes sent to the client.
///
/// The entry is completed when the body reports end-of-stream, or when the
/// body is dropped first (client went away, or the server stopped polling
/// after the final frame). A panic raised by the inner body, or an unwind
/// that drops it, writes a `level:ERROR` line instead. Either way exactly
/// one line is written.
pub struct CountingBody {
    inner: Body,
    entry: Option<LogEntry>,
    status: u16,
    bytes: u64,
    started: Instant,
}

impl CountingBody {
    pub fn new(inner: Body, entry: LogEntry, status: u16, started: Instant) -> Self {
        Self {
            inner,
            entry: Some(entry),
            status,
            bytes: 0,
            started,
        }
    }

    fn finish(&mut self) {
        if let Some(entry) = self.entry.take() {
            entry.complete(self.status, self.bytes, self.started.elapsed());
        }
    }

    fn fail(&mut self, message: &str) {
        if let Some(entry) = self.entry.take() {
            let stack = take_stack().unwrap_or_default();
            entry.panic(message, stack.as_bytes());
        }
    }
}

impl HttpBody for CountingBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let inner = &mut this.inner;
        let polled = panic::catch_unwind(AssertUnwindSafe(|| Pin::new(inner).poll_frame(cx)));
        let polled = match polled {
            Ok(polled) => polled,
            Err(payload) => {
                this.fail(&panic_message(payload.as_ref()));
                panic::resume_unwind(payload);
            }
        };

        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.bytes += data.len() as u64;
                }
            }
            Poll::Ready(None) => this.finish(),
            _ => {}
        }

        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for CountingBody {
    fn drop(&mut self) {
        if thread::panicking() {
            self.fail(DROPPED_WHILE_PANICKING);
        } else {
            self.finish();
        }
    }
}
