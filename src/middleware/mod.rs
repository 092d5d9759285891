//! HTTP middleware wiring the access logger into Axum.
//!
//! - [`access_log`] - LTSV line per request, panic recovery
//! - [`counting_body`] - Response body byte counting
//! - [`panic`] - Panic message and stack capture
//! - [`request_id`] - Request id assignment via tower-http

pub mod access_log;
pub mod counting_body;
pub mod panic;
pub mod request_id;
