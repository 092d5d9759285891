//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: The access log writer has stopped
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "access_log": {
///       "status": "ok",
///       "message": "Queue capacity: 9998/10000"
///     }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let access_log = check_access_log(&state);
    let healthy = access_log.status == "ok";

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks { access_log },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks that the access log file writer is still draining its queue.
fn check_access_log(state: &AppState) -> CheckStatus {
    match &state.access_log_queue {
        None => CheckStatus {
            status: "ok".to_string(),
            message: None,
        },
        Some(queue) if queue.is_closed() => CheckStatus {
            status: "error".to_string(),
            message: Some("Access log writer stopped".to_string()),
        },
        Some(queue) => CheckStatus {
            status: "ok".to_string(),
            message: Some(format!(
                "Queue capacity: {}/{}",
                queue.capacity(),
                queue.max_capacity()
            )),
        },
    }
}
