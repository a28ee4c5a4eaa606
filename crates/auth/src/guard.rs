//! Endpoint-level authorization guard.
//!
//! Operations call `authorize` at their entry with the exact capability they
//! need, expressed as a value. This is the only place a request is rejected
//! for authentication/authorization reasons; the request gate upstream never
//! rejects.

use agora_core::{DomainError, UserId};

use crate::principal::Principal;
use crate::roles::Role;

/// The authorization requirement of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Any authenticated user.
    AnyUser,

    /// Membership in a specific role.
    HasRole(Role),

    /// The owner of the referenced resource, or any ADMIN.
    OwnerOrAdmin(UserId),
}

/// Allow or deny. Missing principal is always `Auth("not authenticated")`;
/// a present but insufficient principal is `Authz("forbidden")`.
///
/// - No IO
/// - No panics
pub fn authorize(principal: Option<&Principal>, required: &Capability) -> Result<(), DomainError> {
    let Some(principal) = principal else {
        return Err(DomainError::auth("not authenticated"));
    };

    let allowed = match required {
        Capability::AnyUser => true,
        Capability::HasRole(role) => principal.has_role(role),
        Capability::OwnerOrAdmin(owner) => principal.id == *owner || principal.is_admin(),
    };

    if allowed {
        Ok(())
    } else {
        Err(DomainError::authz("forbidden"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: Vec<Role>) -> Principal {
        Principal {
            id: UserId::new(),
            username: "alice".into(),
            roles,
            is_adult: true,
        }
    }

    #[test]
    fn anonymous_is_not_authenticated_for_every_capability() {
        for cap in [
            Capability::AnyUser,
            Capability::HasRole(Role::ADMIN),
            Capability::OwnerOrAdmin(UserId::new()),
        ] {
            assert_eq!(
                authorize(None, &cap).unwrap_err(),
                DomainError::auth("not authenticated")
            );
        }
    }

    #[test]
    fn any_user_allows_any_principal() {
        let p = user(vec![]);
        assert!(authorize(Some(&p), &Capability::AnyUser).is_ok());
    }

    #[test]
    fn role_check_denies_non_admin_and_allows_admin() {
        let cap = Capability::HasRole(Role::ADMIN);

        let plain = user(vec![Role::USER]);
        assert_eq!(
            authorize(Some(&plain), &cap).unwrap_err(),
            DomainError::authz("forbidden")
        );

        let admin = user(vec![Role::USER, Role::ADMIN]);
        assert!(authorize(Some(&admin), &cap).is_ok());
    }

    #[test]
    fn owner_or_admin_allows_owner_and_admin_only() {
        let owner = user(vec![Role::USER]);
        let cap = Capability::OwnerOrAdmin(owner.id);

        assert!(authorize(Some(&owner), &cap).is_ok());

        let stranger = user(vec![Role::USER]);
        assert_eq!(
            authorize(Some(&stranger), &cap).unwrap_err(),
            DomainError::authz("forbidden")
        );

        let admin = user(vec![Role::ADMIN]);
        assert!(authorize(Some(&admin), &cap).is_ok());
    }
}
