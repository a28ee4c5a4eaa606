//! Shared service graph handed to every handler via `Extension`.

use std::sync::Arc;

use agora_auth::{Authenticator, CredentialIssuer, CredentialStore, PasswordVault, TokenCodec};
use agora_infra::{InMemoryCredentialStore, InMemoryMessageStore};

use crate::config::AppConfig;

use super::routes::chat::ChannelRouter;

/// Broadcast buffer for direct-message fanout. A slow websocket that falls
/// more than this many messages behind observes a `Lagged` error and skips
/// ahead rather than blocking senders.
const CHANNEL_CAPACITY: usize = 256;

pub struct AppServices {
    pub store: Arc<dyn CredentialStore>,
    pub messages: Arc<InMemoryMessageStore>,
    pub codec: Arc<TokenCodec>,
    pub issuer: CredentialIssuer,
    pub authenticator: Authenticator,
    pub channels: ChannelRouter,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let store: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::new());
        let messages = Arc::new(InMemoryMessageStore::new());
        let codec = Arc::new(TokenCodec::new(
            config.signing_key.clone(),
            config.token_ttl,
        ));
        let vault = PasswordVault::new();

        Self {
            issuer: CredentialIssuer::new(store.clone(), vault.clone()),
            authenticator: Authenticator::new(store.clone(), vault, codec.clone()),
            channels: ChannelRouter::new(store.clone(), messages.clone(), CHANNEL_CAPACITY),
            store,
            messages,
            codec,
        }
    }
}
