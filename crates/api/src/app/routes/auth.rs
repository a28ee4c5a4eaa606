//! Registration and login. Both paths are exempt from the request gate.

use std::sync::Arc;

use axum::{
    Extension, Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::app::dto::{LoginRequest, SignupRequest};
use crate::app::errors::domain_error_response;
use crate::app::services::AppServices;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<SignupRequest>,
) -> Response {
    match services.issuer.register(body.into_new_user()) {
        Ok(identity) => {
            tracing::info!(user_id = %identity.id, username = %identity.username, "user registered");
            (
                StatusCode::CREATED,
                Json(json!({ "message": "user registered", "id": identity.id })),
            )
                .into_response()
        }
        Err(err) => domain_error_response(&err),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> Response {
    match services.authenticator.login(&body.username, &body.password) {
        Ok(outcome) => {
            tracing::info!(user_id = %outcome.id, "login succeeded");
            Json(outcome).into_response()
        }
        Err(err) => {
            tracing::debug!(username = %body.username, "login rejected");
            domain_error_response(&err)
        }
    }
}
