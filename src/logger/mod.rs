//! LTSV access log records.
//!
//! A [`LoggerFactory`] is built once at startup around a
//! [`LineSink`](crate::sink::LineSink). For every request it hands out a
//! [`LogEntry`] that captures the request fields; the entry is then
//! finalized exactly once, either by [`LogEntry::complete`] or by
//! [`LogEntry::panic`].
//!
//! # Line Format
//!
//! ```text
//! request-id:abc123	method:GET	uri:http://example.com/foo?x=1	protocol:HTTP/1.1	remote-host:10.0.0.5:1234	status:200	bytes:1024	time-taken:0.0034
//! request-id:abc123	method:GET	uri:http://example.com/foo?x=1	protocol:HTTP/1.1	remote-host:10.0.0.5:1234	level:ERROR	message:boom	stack:...
//! ```

mod entry;
pub mod escape;
mod factory;
pub mod request;

pub use entry::LogEntry;
pub use escape::escape;
pub use factory::LoggerFactory;
pub use request::{RequestInfo, RequestMeta};
