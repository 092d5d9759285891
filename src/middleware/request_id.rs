//! Request id assignment and propagation.
//!
//! Ids are generated by tower-http; the access log only reads them.

use axum::http::HeaderName;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Default request id header.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Assigns a UUID v4 to requests that arrive without `header`.
///
/// Existing ids are kept. Apply it outside the access log middleware so the
/// id is available when the entry is created.
pub fn set_layer(header: HeaderName) -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(header, MakeRequestUuid)
}

/// Copies the request id onto the response.
pub fn propagate_layer(header: HeaderName) -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(header)
}
