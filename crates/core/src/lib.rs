//! `agora-core` — shared foundation for the credential/authorization subsystem.
//!
//! Only typed identifiers and the domain error taxonomy live here; anything
//! with behavior belongs in `agora-auth` and above.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{MessageId, UserId};
