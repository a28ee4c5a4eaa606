//! Liveness and smoke-test endpoints, both exempt from the request gate.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn ping() -> impl IntoResponse {
    Json(json!({ "message": "pong" }))
}
