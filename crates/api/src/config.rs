//! Process configuration.
//!
//! Everything here is resolved once at startup; a malformed signing key or
//! TTL aborts the process instead of surfacing per request.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use agora_auth::{KeyError, SigningKey};

pub const ENV_JWT_SECRET: &str = "AGORA_JWT_SECRET";
pub const ENV_JWT_TTL_SECS: &str = "AGORA_JWT_TTL_SECS";
pub const ENV_BIND_ADDR: &str = "AGORA_BIND_ADDR";

const DEFAULT_TTL_SECS: i64 = 86_400;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{ENV_JWT_SECRET} is not set")]
    MissingSecret,

    #[error("{ENV_JWT_SECRET} is invalid: {0}")]
    InvalidSecret(#[from] KeyError),

    #[error("{ENV_JWT_TTL_SECS} must be a positive integer")]
    InvalidTtl,

    #[error("{ENV_BIND_ADDR} is not a valid socket address")]
    InvalidBindAddr,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub signing_key: SigningKey,
    pub token_ttl: Duration,
}

impl AppConfig {
    /// Read configuration from the environment. Any failure here is fatal to
    /// startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup(ENV_JWT_SECRET).ok_or(ConfigError::MissingSecret)?;
        let signing_key = SigningKey::from_hex(&secret)?;

        let ttl_secs = match lookup(ENV_JWT_TTL_SECS) {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| ConfigError::InvalidTtl)?,
            None => DEFAULT_TTL_SECS,
        };
        if ttl_secs <= 0 {
            return Err(ConfigError::InvalidTtl);
        }

        let bind_addr = lookup(ENV_BIND_ADDR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr)?;

        Ok(Self {
            bind_addr,
            signing_key,
            token_ttl: Duration::seconds(ttl_secs),
        })
    }
}
