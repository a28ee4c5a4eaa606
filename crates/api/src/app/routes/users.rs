//! Profile and admin user-management handlers.
//!
//! Every handler here runs behind the request gate; the gate never rejects,
//! so authorization happens in exactly one place: the `authorize` call at the
//! top of each handler.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use agora_auth::{Capability, ProfileUpdate, Role, StoreError};
use agora_core::{DomainError, UserId};

use crate::app::dto::{
    ProfileUpdateRequest, PublicProfileResponse, RolesUpdateRequest, UserProfileResponse,
};
use crate::app::errors::domain_error_response;
use crate::app::routes::require;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn me(
    ctx: Option<Extension<PrincipalContext>>,
    Extension(services): Extension<Arc<AppServices>>,
) -> Response {
    let principal = match require(&ctx, &Capability::AnyUser) {
        Ok(p) => p,
        Err(err) => return domain_error_response(&err),
    };

    match services.store.find_by_id(principal.id) {
        Some(identity) => {
            Json(UserProfileResponse::from_identity(&identity, today())).into_response()
        }
        None => domain_error_response(&DomainError::not_found("user not found")),
    }
}

pub async fn update_me(
    ctx: Option<Extension<PrincipalContext>>,
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ProfileUpdateRequest>,
) -> Response {
    let principal = match require(&ctx, &Capability::AnyUser) {
        Ok(p) => p,
        Err(err) => return domain_error_response(&err),
    };

    apply_profile_update(&services, principal.id, body)
}

/// Update an arbitrary user's profile. Owner or admin only.
pub async fn update_user(
    ctx: Option<Extension<PrincipalContext>>,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<ProfileUpdateRequest>,
) -> Response {
    let target = match UserId::from_str(&id) {
        Ok(id) => id,
        Err(err) => return domain_error_response(&err),
    };
    if let Err(err) = require(&ctx, &Capability::OwnerOrAdmin(target)) {
        return domain_error_response(&err);
    }

    apply_profile_update(&services, target, body)
}

pub async fn public_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Path(username): Path<String>,
) -> Response {
    match services.store.find_by_username(&username) {
        Some(identity) => {
            Json(PublicProfileResponse::from_identity(&identity, today())).into_response()
        }
        None => domain_error_response(&DomainError::not_found("user not found")),
    }
}

pub async fn list_users(
    ctx: Option<Extension<PrincipalContext>>,
    Extension(services): Extension<Arc<AppServices>>,
) -> Response {
    if let Err(err) = require(&ctx, &Capability::HasRole(Role::ADMIN)) {
        return domain_error_response(&err);
    }

    let now = today();
    let users: Vec<_> = services
        .store
        .list()
        .iter()
        .map(|identity| UserProfileResponse::from_identity(identity, now))
        .collect();
    Json(users).into_response()
}

pub async fn delete_user(
    ctx: Option<Extension<PrincipalContext>>,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    if let Err(err) = require(&ctx, &Capability::HasRole(Role::ADMIN)) {
        return domain_error_response(&err);
    }
    let target = match UserId::from_str(&id) {
        Ok(id) => id,
        Err(err) => return domain_error_response(&err),
    };

    match services.store.delete(target) {
        Ok(()) => {
            tracing::info!(user_id = %target, "user deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(StoreError::NotFound) => {
            domain_error_response(&DomainError::not_found("user not found"))
        }
        Err(err) => domain_error_response(&DomainError::validation(err.to_string())),
    }
}

pub async fn update_roles(
    ctx: Option<Extension<PrincipalContext>>,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<RolesUpdateRequest>,
) -> Response {
    if let Err(err) = require(&ctx, &Capability::HasRole(Role::ADMIN)) {
        return domain_error_response(&err);
    }
    let target = match UserId::from_str(&id) {
        Ok(id) => id,
        Err(err) => return domain_error_response(&err),
    };
    if body.roles.is_empty() {
        return domain_error_response(&DomainError::validation("role set must not be empty"));
    }

    let roles: Vec<Role> = body.roles.into_iter().map(Role::new).collect();
    match services.store.update_roles(target, roles) {
        Ok(identity) => {
            tracing::info!(user_id = %target, "roles updated");
            Json(UserProfileResponse::from_identity(&identity, today())).into_response()
        }
        Err(StoreError::NotFound) => {
            domain_error_response(&DomainError::not_found("user not found"))
        }
        Err(err) => domain_error_response(&DomainError::validation(err.to_string())),
    }
}

fn apply_profile_update(
    services: &AppServices,
    target: UserId,
    body: ProfileUpdateRequest,
) -> Response {
    if let Some(email) = body.email.as_deref() {
        if !email.contains('@') || email.len() > 50 {
            return domain_error_response(&DomainError::validation("email is invalid"));
        }
    }
    if let Some(dob) = body.date_of_birth {
        if dob >= today() {
            return domain_error_response(&DomainError::validation(
                "date of birth must be in the past",
            ));
        }
    }

    let update = ProfileUpdate {
        email: body.email.map(|e| e.trim().to_ascii_lowercase()),
        date_of_birth: body.date_of_birth,
    };
    match services.store.update_profile(target, update) {
        Ok(identity) => {
            Json(UserProfileResponse::from_identity(&identity, today())).into_response()
        }
        Err(StoreError::NotFound) => {
            domain_error_response(&DomainError::not_found("user not found"))
        }
        Err(StoreError::DuplicateEmail) => {
            domain_error_response(&DomainError::conflict("email taken"))
        }
        Err(err) => domain_error_response(&DomainError::validation(err.to_string())),
    }
}

fn today() -> chrono::NaiveDate {
    Utc::now().date_naive()
}
