//! One-way password hashing.
//!
//! Argon2id with a fresh random salt per password, stored as a PHC string so
//! parameters travel with the hash. Verification is constant-time inside the
//! argon2 crate.

use argon2::password_hash::{PasswordHash, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed")]
    Hash,
}

/// Stateless hashing facade. `Default` parameters of Argon2id are used; any
/// future parameter change keeps old hashes verifiable via the PHC string.
#[derive(Debug, Clone, Default)]
pub struct PasswordVault;

impl PasswordVault {
    pub fn new() -> Self {
        Self
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|_| PasswordError::Hash)?;
        Ok(phc.to_string())
    }

    /// Verify a candidate against a stored PHC hash. A stored hash that fails
    /// to parse counts as a mismatch rather than an error; the caller must not
    /// be able to distinguish the two.
    pub fn verify(&self, stored_hash: &str, candidate: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => {
                tracing::warn!("stored password hash is not a valid PHC string");
                false
            }
        }
    }
}
