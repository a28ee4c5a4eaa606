//! Login: password verification and token issuance.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use agora_core::{DomainError, UserId};

use crate::password::PasswordVault;
use crate::roles::Role;
use crate::store::CredentialStore;
use crate::token::TokenCodec;

/// Successful login payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
}

/// Verifies credentials and asks the codec for a bearer token.
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    vault: PasswordVault,
    codec: Arc<TokenCodec>,
}

impl Authenticator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        vault: PasswordVault,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self { store, vault, codec }
    }

    /// Authenticate `username`/`password`. An unknown username and a wrong
    /// password produce byte-identical errors so the response cannot be used
    /// to probe which usernames exist.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, DomainError> {
        let invalid = || DomainError::auth("invalid credentials");

        let identity = match self.store.find_by_username(username) {
            Some(identity) => identity,
            None => {
                // Burn a verification anyway so the miss costs roughly as much
                // as a mismatch.
                let _ = self.vault.verify(DUMMY_HASH, password);
                return Err(invalid());
            }
        };

        if !self.vault.verify(&identity.password_hash, password) {
            return Err(invalid());
        }

        let token = self
            .codec
            .issue(&identity, Utc::now())
            .map_err(|_| invalid())?;

        tracing::info!(user = %identity.username, "login succeeded");

        Ok(LoginOutcome {
            token,
            id: identity.id,
            username: identity.username,
            email: identity.email,
            roles: identity.roles,
        })
    }
}

// A syntactically valid Argon2id PHC string that matches no real password.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$MDAwMDAwMDAwMDAwMDAwMA$c2l4dGVlbmJ5dGVzb2ZoYXNoMDAwMDAwMDAwMDA";
