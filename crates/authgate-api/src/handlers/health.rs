//! Liveness endpoint.

use axum::Json;
use serde_json::{json, Value};

/// Report that the gateway process is up.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
