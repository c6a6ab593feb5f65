//! Web router construction.

use axum::{Router, http::StatusCode, routing::get};
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

use crate::state::AppState;
use crate::web::middleware::request_id::RequestIdLayer;
use crate::web::status;

/// Upper bound on handling a single request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Versioned API namespace. Reserved; nothing is mounted under it yet.
pub const API_V1_PREFIX: &str = "/api/v1";

/// Business endpoints built on [`AppState::db`] are registered here.
fn api_v1_router() -> Router<AppState> {
    Router::new()
}

/// Requests still running after `timeout` are answered with 408.
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Creates the web server router
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(status::health))
        .nest(API_V1_PREFIX, api_v1_router())
        .with_state(app_state)
        .layer((
            // Outermost: per-request ID span + severity-proportional response logging.
            RequestIdLayer,
            timeout_layer(REQUEST_TIMEOUT),
        ))
}
