//! Request-scoped authenticated identity.

use agora_core::UserId;
use serde::Serialize;

use crate::roles::Role;
use crate::token::Claims;

/// The identity installed for a single request or realtime connection after a
/// token verified. Passed explicitly through the call chain; there is no
/// ambient/global security context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: UserId,
    pub username: String,
    pub roles: Vec<Role>,
    pub is_adult: bool,
}

impl Principal {
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(&Role::ADMIN)
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.sub,
            roles: claims.roles,
            is_adult: claims.is_adult,
        }
    }
}
