//! HTTP application wiring (axum router + services).
//!
//! Layout:
//! - `services.rs`: store/codec/issuer wiring shared by handlers
//! - `routes/`: handlers, one file per surface area
//! - `dto.rs`: request/response payloads and JSON mapping
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post, put},
};

use crate::config::AppConfig;
use crate::middleware::{self, GateState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full router (public entrypoint used by `main.rs` and tests).
///
/// The request gate wraps everything, including the exempt paths — it is the
/// gate itself that decides to leave those untouched.
pub fn build_app(config: &AppConfig) -> Router {
    let services = Arc::new(AppServices::new(config));
    let gate = GateState {
        codec: services.codec.clone(),
    };

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/api/test/ping", get(routes::system::ping))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route(
            "/api/users/me",
            get(routes::users::me).put(routes::users::update_me),
        )
        .route("/api/users/:id", put(routes::users::update_user))
        .route("/api/users/by-name/:username", get(routes::users::public_profile))
        .route("/api/admin/users", get(routes::users::list_users))
        .route(
            "/api/admin/users/:id",
            axum::routing::delete(routes::users::delete_user),
        )
        .route("/api/admin/users/:id/roles", put(routes::users::update_roles))
        .route("/api/messages/:user_id", get(routes::messages::conversation))
        .route("/api/messages/read", post(routes::messages::mark_read))
        .route("/ws", get(routes::chat::ws_handler))
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            gate,
            middleware::request_gate,
        ))
}
