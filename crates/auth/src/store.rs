//! Credential store boundary.
//!
//! The store owns `Identity` records durably; this crate only calls the
//! operations below. Uniqueness of username/email is ultimately the store's
//! responsibility: concurrent registrations may pass the issuer's pre-checks,
//! and the store's duplicate rejection is then the final authority.

use chrono::NaiveDate;
use thiserror::Error;

use agora_core::UserId;

use crate::{Identity, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("username already exists")]
    DuplicateUsername,

    #[error("email already exists")]
    DuplicateEmail,

    #[error("identity not found")]
    NotFound,
}

/// Partial profile update; `None` fields are left untouched, `Some` fields
/// replace the stored value atomically.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Durable record of identities. Implementations must be safe to share across
/// request tasks and must enforce username/email uniqueness on insert.
pub trait CredentialStore: Send + Sync {
    /// Insert a new identity, rejecting duplicates atomically.
    fn insert(&self, identity: Identity) -> Result<Identity, StoreError>;

    fn find_by_id(&self, id: UserId) -> Option<Identity>;

    fn find_by_username(&self, username: &str) -> Option<Identity>;

    fn username_exists(&self, username: &str) -> bool;

    fn email_exists(&self, email: &str) -> bool;

    /// True if `email` belongs to an identity other than `id` (self-edit check).
    fn email_taken_by_other(&self, email: &str, id: UserId) -> bool;

    /// Replace the whole role set of an identity.
    fn update_roles(&self, id: UserId, roles: Vec<Role>) -> Result<Identity, StoreError>;

    /// Replace profile fields per `ProfileUpdate`.
    fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<Identity, StoreError>;

    fn delete(&self, id: UserId) -> Result<(), StoreError>;

    fn list(&self) -> Vec<Identity>;
}
