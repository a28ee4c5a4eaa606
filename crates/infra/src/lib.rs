//! `agora-infra` — in-process implementations of the storage boundaries.
//!
//! The API wires these in by default; a persistent backend would implement the
//! same traits without touching `agora-auth`.

pub mod messages;
pub mod users;

pub use messages::{InMemoryMessageStore, MessageRecord};
pub use users::InMemoryCredentialStore;
