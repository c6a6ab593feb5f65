//! Liveness endpoint.

use axum::response::Json;
use serde_json::{Value, json};
use tracing::trace;

/// `GET /health`
///
/// Answers unconditionally without touching the database, so it reports
/// process liveness only. It keeps answering after the pool is closed.
pub(super) async fn health() -> Json<Value> {
    trace!("health check requested");
    Json(json!({ "status": "healthy" }))
}
