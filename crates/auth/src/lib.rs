//! `agora-auth` — stateless credential and authorization core.
//!
//! This crate is intentionally decoupled from HTTP and storage: the credential
//! store is a trait implemented elsewhere, and the request surface consumes
//! `Principal` + `authorize` without this crate knowing about transports.

pub mod authenticator;
pub mod guard;
pub mod identity;
pub mod issuer;
pub mod password;
pub mod principal;
pub mod roles;
pub mod store;
pub mod token;

pub use authenticator::{Authenticator, LoginOutcome};
pub use guard::{Capability, authorize};
pub use identity::{DerivedAuthFacts, Identity, NewUser, age_on};
pub use issuer::CredentialIssuer;
pub use password::PasswordVault;
pub use principal::Principal;
pub use roles::Role;
pub use store::{CredentialStore, ProfileUpdate, StoreError};
pub use token::{Claims, KeyError, SigningKey, TokenCodec, TokenError};
