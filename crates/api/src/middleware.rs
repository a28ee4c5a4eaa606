//! The request gate.
//!
//! Runs once per inbound request, before routing. It either leaves the request
//! anonymous or installs a `PrincipalContext`; it never rejects. Rejection is
//! the authorization guard's job inside each handler, which is what lets
//! public endpoints personalize for a caller that happens to carry a token.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, header},
    middleware::Next,
    response::Response,
};

use agora_auth::{Principal, TokenCodec};

use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct GateState {
    pub codec: Arc<TokenCodec>,
}

/// Per-request gate. Order of evaluation:
/// 1. exempt paths dispatch untouched (no token inspection at all);
/// 2. no bearer header: dispatch anonymous;
/// 3. bearer present: verify; install the principal on success, log and
///    dispatch anonymous on any verify error.
pub async fn request_gate(State(gate): State<GateState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();

    if is_exempt(&path, req.method()) {
        return next.run(req).await;
    }

    let Some(token) = bearer_token(req.headers()) else {
        return next.run(req).await;
    };
    let token = token.to_owned();

    match gate.codec.verify(&token) {
        Ok(claims) => {
            let principal = Principal::from(claims);
            tracing::debug!(user = %principal.username, %path, "request authenticated");
            req.extensions_mut().insert(PrincipalContext::new(principal));
        }
        Err(e) => {
            // Degrade to anonymous; the guard downstream decides whether this
            // request needed an identity.
            tracing::debug!(error = %e, %path, "bearer token rejected");
        }
    }

    next.run(req).await
}

/// Paths that bypass token inspection entirely: the auth endpoints themselves,
/// the diagnostics group, the realtime handshake, and cross-origin preflight
/// requests regardless of target.
pub fn is_exempt(path: &str, method: &Method) -> bool {
    if method == Method::OPTIONS {
        return true;
    }
    path.starts_with("/api/auth/")
        || path.starts_with("/api/test/")
        || path == "/ws"
        || path.starts_with("/ws/")
        || path == "/health"
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}
