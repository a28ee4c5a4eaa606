//! Registration: uniqueness and minimum-age policy, then persistence.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use agora_core::{DomainError, UserId};

use crate::identity::{Identity, MINIMUM_AGE, NewUser, age_on};
use crate::password::PasswordVault;
use crate::roles::Role;
use crate::store::{CredentialStore, StoreError};

/// Creates identity records. No side effects occur when validation fails; the
/// single store insert is the only write.
pub struct CredentialIssuer {
    store: Arc<dyn CredentialStore>,
    vault: PasswordVault,
}

impl CredentialIssuer {
    pub fn new(store: Arc<dyn CredentialStore>, vault: PasswordVault) -> Self {
        Self { store, vault }
    }

    /// Register a new user. Field shapes are validated first, then the
    /// checks run in a fixed order: `Conflict("username taken")`,
    /// `Conflict("email taken")`, `Policy("underage")`.
    pub fn register(&self, new_user: NewUser) -> Result<Identity, DomainError> {
        let today = Utc::now().date_naive();
        self.register_at(new_user, today)
    }

    /// Clock-injected variant used by tests.
    pub fn register_at(&self, new_user: NewUser, today: NaiveDate) -> Result<Identity, DomainError> {
        validate_shape(&new_user, today)?;

        // Fast-path checks; the store re-checks under its own lock.
        if self.store.username_exists(&new_user.username) {
            return Err(DomainError::conflict("username taken"));
        }
        if self.store.email_exists(&new_user.email) {
            return Err(DomainError::conflict("email taken"));
        }

        if age_on(new_user.date_of_birth, today) < MINIMUM_AGE {
            return Err(DomainError::policy("underage"));
        }

        let password_hash = self
            .vault
            .hash(&new_user.password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let now = Utc::now();
        let identity = Identity {
            id: UserId::new(),
            username: new_user.username.trim().to_string(),
            email: new_user.email.trim().to_lowercase(),
            password_hash,
            roles: vec![Role::USER],
            date_of_birth: new_user.date_of_birth,
            created_at: now,
            updated_at: now,
        };

        // Duplicate rejection here is the race losing against a concurrent
        // registration; surface it exactly like the pre-check.
        self.store.insert(identity).map_err(|e| match e {
            StoreError::DuplicateUsername => DomainError::conflict("username taken"),
            StoreError::DuplicateEmail => DomainError::conflict("email taken"),
            StoreError::NotFound => DomainError::not_found("identity"),
        })
    }
}

fn validate_shape(new_user: &NewUser, today: NaiveDate) -> Result<(), DomainError> {
    let username = new_user.username.trim();
    if username.len() < 3 || username.len() > 20 {
        return Err(DomainError::validation(
            "username must be between 3 and 20 characters",
        ));
    }
    let email = new_user.email.trim();
    if email.is_empty() || email.len() > 50 || !email.contains('@') {
        return Err(DomainError::validation("email is not valid"));
    }
    if new_user.password.len() < 6 || new_user.password.len() > 40 {
        return Err(DomainError::validation(
            "password must be between 6 and 40 characters",
        ));
    }
    if new_user.date_of_birth >= today {
        return Err(DomainError::validation("date of birth must be in the past"));
    }
    Ok(())
}
