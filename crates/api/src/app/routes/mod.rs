use axum::Extension;

use agora_auth::{Capability, Principal, authorize};
use agora_core::DomainError;

use crate::context::PrincipalContext;

pub mod auth;
pub mod chat;
pub mod messages;
pub mod system;
pub mod users;

/// Run the guard and hand back the principal on success.
fn require<'a>(
    ctx: &'a Option<Extension<PrincipalContext>>,
    capability: &Capability,
) -> Result<&'a Principal, DomainError> {
    let principal = ctx.as_ref().map(|ext| ext.principal());
    authorize(principal, capability)?;
    principal.ok_or_else(|| DomainError::auth("not authenticated"))
}
