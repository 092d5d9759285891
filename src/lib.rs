//! # LTSV Access Log
//!
//! Request logging middleware for Axum that writes one LTSV (Labeled
//! Tab-Separated Values) line per request.
//!
//! ## Architecture
//!
//! - **Logger** ([`logger`]) - [`LoggerFactory`] and per-request [`LogEntry`], field escaping
//! - **Sinks** ([`sink`]) - Line destinations behind the [`LineSink`] trait
//! - **Middleware** ([`middleware`]) - Axum adapter: request extraction, byte counting, panic recovery
//! - **Server** ([`server`], [`routes`], [`handlers`]) - Demo service hosting the middleware
//!
//! ## Line Format
//!
//! ```text
//! [request-id:<id>\t]method:<METHOD>\turi:<scheme>://<host><target>\tprotocol:<proto>\tremote-host:<addr>\tstatus:<code>\tbytes:<n>\ttime-taken:<seconds>
//! [<request fields>\t]level:ERROR\tmessage:<escaped>\tstack:<escaped>
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let factory = LoggerFactory::new(Arc::new(WriterSink::stdout()));
//! let app = Router::new()
//!     .route("/", get(index))
//!     .layer(middleware::from_fn_with_state(
//!         AccessLog::new(factory),
//!         access_log::layer,
//!     ));
//! ```
//!
//! ## Configuration
//!
//! The demo server reads its settings from environment variables via
//! [`config::Config`]. See [`config`] module for available options.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod logger;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod sink;
pub mod state;

pub use error::SinkError;
pub use logger::{LogEntry, LoggerFactory};
pub use sink::LineSink;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::error::SinkError;
    pub use crate::logger::{LogEntry, LoggerFactory, RequestInfo, RequestMeta, escape};
    pub use crate::middleware::access_log::{AccessLog, Tls};
    pub use crate::sink::{ChannelSink, LineSink, MemorySink, TracingSink, WriterSink};
}
