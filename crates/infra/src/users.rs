//! In-memory credential store.
//!
//! All uniqueness checks and the insert happen under one lock, which makes
//! this store the final authority for concurrent registrations racing on the
//! same username or email.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use agora_core::UserId;
use agora_auth::{CredentialStore, Identity, ProfileUpdate, Role, StoreError};

#[derive(Default)]
pub struct InMemoryCredentialStore {
    inner: Mutex<HashMap<UserId, Identity>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn insert(&self, identity: Identity) -> Result<Identity, StoreError> {
        let mut map = self.inner.lock().expect("credential store poisoned");
        if map.values().any(|i| i.username == identity.username) {
            return Err(StoreError::DuplicateUsername);
        }
        if map.values().any(|i| i.email == identity.email) {
            return Err(StoreError::DuplicateEmail);
        }
        map.insert(identity.id, identity.clone());
        Ok(identity)
    }

    fn find_by_id(&self, id: UserId) -> Option<Identity> {
        self.inner.lock().expect("credential store poisoned").get(&id).cloned()
    }

    fn find_by_username(&self, username: &str) -> Option<Identity> {
        self.inner
            .lock()
            .expect("credential store poisoned")
            .values()
            .find(|i| i.username == username)
            .cloned()
    }

    fn username_exists(&self, username: &str) -> bool {
        self.find_by_username(username).is_some()
    }

    fn email_exists(&self, email: &str) -> bool {
        self.inner
            .lock()
            .expect("credential store poisoned")
            .values()
            .any(|i| i.email == email)
    }

    fn email_taken_by_other(&self, email: &str, id: UserId) -> bool {
        self.inner
            .lock()
            .expect("credential store poisoned")
            .values()
            .any(|i| i.email == email && i.id != id)
    }

    fn update_roles(&self, id: UserId, roles: Vec<Role>) -> Result<Identity, StoreError> {
        let mut map = self.inner.lock().expect("credential store poisoned");
        let identity = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        identity.roles = roles;
        identity.updated_at = Utc::now();
        Ok(identity.clone())
    }

    fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<Identity, StoreError> {
        let mut map = self.inner.lock().expect("credential store poisoned");
        if let Some(email) = &update.email {
            if map.values().any(|i| &i.email == email && i.id != id) {
                return Err(StoreError::DuplicateEmail);
            }
        }
        let identity = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(email) = update.email {
            identity.email = email;
        }
        if let Some(dob) = update.date_of_birth {
            identity.date_of_birth = dob;
        }
        identity.updated_at = Utc::now();
        Ok(identity.clone())
    }

    fn delete(&self, id: UserId) -> Result<(), StoreError> {
        self.inner
            .lock()
            .expect("credential store poisoned")
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn list(&self) -> Vec<Identity> {
        let mut all: Vec<Identity> = self
            .inner
            .lock()
            .expect("credential store poisoned")
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        all
    }
}
