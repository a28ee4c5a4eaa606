//! Signed bearer token codec.
//!
//! Tokens are compact JWTs: three dot-separated base64url segments (header,
//! flat claim map, HMAC-SHA256 signature). The signing key is process-wide,
//! loaded once from a hex string, and immutable afterwards. There is no
//! revocation list; expiry is the only termination mechanism, and logout is a
//! client-side discard.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use agora_core::UserId;

use crate::{Identity, Role};

/// Process-wide HMAC secret, decoded from hex at startup.
#[derive(Clone)]
pub struct SigningKey {
    bytes: Vec<u8>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("signing key is not valid hex")]
    InvalidHex,

    #[error("signing key must be at least 32 bytes, got {0}")]
    TooShort(usize),
}

impl SigningKey {
    /// Decode a hex-encoded secret. HS256 wants at least 256 bits of key
    /// material, so shorter inputs are rejected outright.
    pub fn from_hex(hex_secret: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_secret.trim()).map_err(|_| KeyError::InvalidHex)?;
        if bytes.len() < 32 {
            return Err(KeyError::TooShort(bytes.len()));
        }
        Ok(Self { bytes })
    }

    fn encoding(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.bytes)
    }

    fn decoding(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.bytes)
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}

/// Claims embedded in an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the subject.
    pub sub: String,
    pub id: UserId,
    pub roles: Vec<Role>,
    #[serde(rename = "isAdult")]
    pub is_adult: bool,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl Claims {
    pub fn for_identity(identity: &Identity, now: DateTime<Utc>, ttl: Duration) -> Self {
        let facts = identity.derived_facts(now.date_naive());
        Self {
            sub: identity.username.clone(),
            id: identity.id,
            roles: identity.roles.clone(),
            is_adult: facts.is_adult,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Token failure taxonomy. The four verification kinds are all treated as
/// "authentication absent" by callers; the split exists so the gate can log
/// each kind distinctly. `Issue` is the signing side and never describes a
/// presented token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token algorithm is not supported")]
    UnsupportedAlgorithm,

    #[error("token issuance failed")]
    Issue,
}

/// Issues and verifies signed bearer tokens. Holds no mutable state and is
/// safely shared across request tasks.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    key: SigningKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(key: SigningKey, ttl: Duration) -> Self {
        Self { key, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for an identity with the configured TTL.
    pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.issue_claims(&Claims::for_identity(identity, now, self.ttl))
    }

    /// Issue a token for a prebuilt claim set (TTL already baked into `exp`).
    pub fn issue_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.key.encoding())
            .map_err(|_| TokenError::Issue)
    }

    /// Decode and verify a presented token: signature against the current key,
    /// `exp` against the wall clock, algorithm pinned to HS256.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        jsonwebtoken::decode::<Claims>(token, &self.key.decoding(), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::UnsupportedAlgorithm
                }
                _ => TokenError::Malformed,
            })
    }
}
