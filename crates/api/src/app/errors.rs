//! Error-to-response mapping shared by all handlers.

use agora_core::DomainError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Build a JSON error body: `{"error": <code>, "message": <detail>}`.
pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "error": code, "message": message.into() })),
    )
        .into_response()
}

/// Single mapping from domain failures to HTTP. Conflicts and policy
/// rejections map to 400 rather than 409/422: the client-facing contract
/// treats every registration failure uniformly.
pub fn domain_error_response(err: &DomainError) -> Response {
    let (status, code) = match err {
        DomainError::Conflict(_) => (StatusCode::BAD_REQUEST, "conflict"),
        DomainError::Policy(_) => (StatusCode::BAD_REQUEST, "policy_violation"),
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        DomainError::Auth(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
        DomainError::Authz(_) => (StatusCode::FORBIDDEN, "forbidden"),
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
    };
    json_error(status, code, err.to_string())
}
