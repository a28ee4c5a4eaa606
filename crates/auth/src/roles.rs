use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for access gating.
///
/// Roles are opaque strings at this layer; the two the system assigns itself
/// are exposed as constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Default role granted to every registered user.
    pub const USER: Role = Role(Cow::Borrowed("USER"));

    /// Administrative role: user management, role updates, any-owner deletes.
    pub const ADMIN: Role = Role(Cow::Borrowed("ADMIN"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
