//! Domain error taxonomy.
//!
//! Each variant maps to one user-facing failure class; messages are safe to
//! surface as-is (no internal causes, no signature detail).

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Duplicate username/email. User-correctable.
    #[error("{0}")]
    Conflict(String),

    /// Business-rule violation (e.g. underage registration).
    #[error("{0}")]
    Policy(String),

    /// Bad credentials or missing/invalid token (401-equivalent).
    #[error("{0}")]
    Auth(String),

    /// Authenticated but insufficient capability (403-equivalent).
    #[error("{0}")]
    Authz(String),

    /// Referenced identity/resource absent (404-equivalent).
    #[error("{0}")]
    NotFound(String),

    /// Malformed input (400-equivalent).
    #[error("{0}")]
    Validation(String),
}

impl DomainError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn policy(msg: impl Into<String>) -> Self {
        Self::Policy(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn authz(msg: impl Into<String>) -> Self {
        Self::Authz(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
