//! Private channel router: websocket direct messages.
//!
//! One broadcast channel carries every delivery; each connection filters by
//! its own address. A delivery names exactly two addresses, the receiver and
//! the sender, so the sender sees an echo of its own message and nobody else
//! sees anything.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Extension,
    extract::{
        Query, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use serde::Deserialize;
use tokio::sync::broadcast;

use agora_auth::{CredentialStore, Principal};
use agora_core::{DomainError, MessageId, UserId};
use agora_infra::{InMemoryMessageStore, MessageRecord};

use crate::app::services::AppServices;

/// One persisted direct message plus the exact set of addresses that may
/// observe it.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub addresses: [UserId; 2],
    pub record: MessageRecord,
}

pub struct ChannelRouter {
    store: Arc<dyn CredentialStore>,
    messages: Arc<InMemoryMessageStore>,
    tx: broadcast::Sender<Delivery>,
}

impl ChannelRouter {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        messages: Arc<InMemoryMessageStore>,
        capacity: usize,
    ) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { store, messages, tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Delivery> {
        self.tx.subscribe()
    }

    /// Persist and fan out one direct message. The sender address always
    /// comes from the authenticated principal.
    pub fn send_direct(
        &self,
        sender: &Principal,
        receiver: UserId,
        content: String,
    ) -> Result<MessageRecord, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::validation("message content is empty"));
        }
        if self.store.find_by_id(receiver).is_none() {
            return Err(DomainError::not_found("receiver not found"));
        }

        let record = self.messages.append(MessageRecord {
            id: MessageId::new(),
            sender: sender.id,
            receiver,
            content,
            timestamp: Utc::now(),
            read: false,
        });
        // No subscribers is fine; the message is already persisted.
        let _ = self.tx.send(Delivery {
            addresses: [record.receiver, record.sender],
            record: record.clone(),
        });
        Ok(record)
    }
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// Outbound frame sent by a connected client. Any `sender` field the client
/// includes is dropped during deserialization; the sender is the principal.
#[derive(Debug, Deserialize)]
struct ClientFrame {
    to: String,
    content: String,
}

/// `GET /ws?token=...`. The path is exempt from the request gate, so the
/// token is verified here, once, at connect time.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    Extension(services): Extension<Arc<AppServices>>,
) -> Response {
    let principal = query.token.as_deref().and_then(|token| {
        match services.codec.verify(token) {
            Ok(claims) => Some(Principal::from(claims)),
            Err(err) => {
                tracing::debug!(error = %err, "websocket token rejected");
                None
            }
        }
    });
    ws.on_upgrade(move |socket| run_connection(socket, principal, services))
}

async fn run_connection(socket: WebSocket, principal: Option<Principal>, services: Arc<AppServices>) {
    let (mut sink, mut stream) = socket.split();

    let Some(principal) = principal else {
        let _ = sink.send(Message::Text(error_frame("not authenticated"))).await;
        let _ = sink.close().await;
        return;
    };

    let me = principal.id;
    let mut deliveries = services.channels.subscribe();
    tracing::info!(user_id = %me, "websocket connected");

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    handle_frame(&services, &principal, &text, &mut sink).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            },
            delivered = deliveries.recv() => match delivered {
                Ok(delivery) if delivery.addresses.contains(&me) => {
                    let Ok(payload) = serde_json::to_string(&delivery.record) else {
                        continue;
                    };
                    if sink.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(user_id = %me, skipped, "websocket fell behind; missed deliveries dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    tracing::debug!(user_id = %me, "websocket disconnected");
}

async fn handle_frame(
    services: &AppServices,
    principal: &Principal,
    text: &str,
    sink: &mut SplitSink<WebSocket, Message>,
) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(_) => {
            let _ = sink.send(Message::Text(error_frame("malformed frame"))).await;
            return;
        }
    };
    let receiver = match UserId::from_str(&frame.to) {
        Ok(id) => id,
        Err(err) => {
            let _ = sink.send(Message::Text(error_frame(&err.to_string()))).await;
            return;
        }
    };

    // The delivery loop echoes the persisted record back to the sender's own
    // address, so a successful send needs no direct reply here.
    if let Err(err) = services.channels.send_direct(principal, receiver, frame.content) {
        let _ = sink.send(Message::Text(error_frame(&err.to_string()))).await;
    }
}

fn error_frame(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}
