//! Wire-format request and response payloads.
//!
//! The JSON surface is camelCase; internal types stay snake_case Rust.

use agora_auth::{Identity, NewUser, Role};
use agora_core::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub date_of_birth: NaiveDate,
}

impl SignupRequest {
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            username: self.username,
            email: self.email,
            password: self.password,
            date_of_birth: self.date_of_birth,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct RolesUpdateRequest {
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub message_ids: Vec<String>,
}

/// Full profile view, returned to the owner and to admins.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub age: i32,
    pub is_adult: bool,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfileResponse {
    pub fn from_identity(identity: &Identity, today: NaiveDate) -> Self {
        let facts = identity.derived_facts(today);
        Self {
            id: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            date_of_birth: identity.date_of_birth,
            age: facts.age,
            is_adult: facts.is_adult,
            roles: identity.roles.clone(),
            created_at: identity.created_at,
            updated_at: identity.updated_at,
        }
    }
}

/// Reduced view for profile lookups by other users. No email, no birth date.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfileResponse {
    pub id: UserId,
    pub username: String,
    pub is_adult: bool,
    pub created_at: DateTime<Utc>,
}

impl PublicProfileResponse {
    pub fn from_identity(identity: &Identity, today: NaiveDate) -> Self {
        let facts = identity.derived_facts(today);
        Self {
            id: identity.id,
            username: identity.username.clone(),
            is_adult: facts.is_adult,
            created_at: identity.created_at,
        }
    }
}
