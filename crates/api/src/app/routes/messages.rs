//! Direct-message history and read receipts (HTTP side of the channel router).

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::Path,
    response::{IntoResponse, Response},
};
use serde_json::json;

use agora_auth::Capability;
use agora_core::{DomainError, MessageId, UserId};

use crate::app::dto::MarkReadRequest;
use crate::app::errors::domain_error_response;
use crate::app::routes::require;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Full two-way history between the caller and `user_id`, oldest first.
pub async fn conversation(
    ctx: Option<Extension<PrincipalContext>>,
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> Response {
    let principal = match require(&ctx, &Capability::AnyUser) {
        Ok(p) => p,
        Err(err) => return domain_error_response(&err),
    };

    let other = match UserId::from_str(&user_id) {
        Ok(id) => id,
        Err(err) => return domain_error_response(&err),
    };
    if services.store.find_by_id(other).is_none() {
        return domain_error_response(&DomainError::not_found("user not found"));
    }

    Json(services.messages.conversation(principal.id, other)).into_response()
}

/// Mark the listed messages as read. Only messages addressed to the caller
/// are affected; ids for other receivers are silently skipped.
pub async fn mark_read(
    ctx: Option<Extension<PrincipalContext>>,
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<MarkReadRequest>,
) -> Response {
    let principal = match require(&ctx, &Capability::AnyUser) {
        Ok(p) => p,
        Err(err) => return domain_error_response(&err),
    };

    let mut ids = Vec::with_capacity(body.message_ids.len());
    for raw in &body.message_ids {
        match MessageId::from_str(raw) {
            Ok(id) => ids.push(id),
            Err(err) => return domain_error_response(&err),
        }
    }

    let updated = services.messages.mark_read(&ids, principal.id);
    Json(json!({ "updated": updated })).into_response()
}
