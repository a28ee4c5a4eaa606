//! Request-scoped authenticated context.

use agora_auth::Principal;

/// Installed by the request gate as an axum `Extension` when a presented token
/// verifies. Lives for exactly one request; handlers that tolerate anonymous
/// callers extract it as `Option<Extension<PrincipalContext>>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}
