//! Router configuration.

use crate::handlers::{health_handler, index_handler};
use crate::middleware::{access_log, access_log::AccessLog, request_id};
use crate::state::AppState;
use axum::{Router, http::HeaderName, middleware, routing::get};
use tower::ServiceBuilder;

/// Builds the application router wrapped in the access log.
///
/// # Endpoints
///
/// - `GET /`       - Greeting
/// - `GET /health` - Access log writer status
///
/// # Layers (outermost first)
///
/// 1. Request id assignment (`request_id_header`, UUID v4 when absent)
/// 2. Request id propagation to the response
/// 3. LTSV access log with panic recovery
pub fn app_router(state: AppState, access_log: AccessLog, request_id_header: HeaderName) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(request_id::set_layer(request_id_header.clone()))
                .layer(request_id::propagate_layer(request_id_header))
                .layer(middleware::from_fn_with_state(
                    access_log,
                    access_log::layer,
                )),
        )
}
