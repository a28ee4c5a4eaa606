//! In-memory direct-message store.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use agora_core::{MessageId, UserId};

/// A stored direct message. `sender` always comes from the authenticated
/// principal of the originating connection, never from the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    pub id: MessageId,
    pub sender: UserId,
    pub receiver: UserId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

#[derive(Default)]
pub struct InMemoryMessageStore {
    inner: Mutex<Vec<MessageRecord>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: MessageRecord) -> MessageRecord {
        let mut all = self.inner.lock().expect("message store poisoned");
        all.push(record.clone());
        record
    }

    /// All messages exchanged between `a` and `b`, ordered by timestamp.
    pub fn conversation(&self, a: UserId, b: UserId) -> Vec<MessageRecord> {
        let all = self.inner.lock().expect("message store poisoned");
        let mut out: Vec<MessageRecord> = all
            .iter()
            .filter(|m| {
                (m.sender == a && m.receiver == b) || (m.sender == b && m.receiver == a)
            })
            .cloned()
            .collect();
        out.sort_by(|x, y| x.timestamp.cmp(&y.timestamp));
        out
    }

    /// Mark messages as read. Only the receiver of a message can mark it;
    /// already-read messages are skipped. Returns the number updated.
    pub fn mark_read(&self, ids: &[MessageId], receiver: UserId) -> usize {
        let mut all = self.inner.lock().expect("message store poisoned");
        let mut updated = 0;
        for m in all.iter_mut() {
            if ids.contains(&m.id) && m.receiver == receiver && !m.read {
                m.read = true;
                updated += 1;
            }
        }
        updated
    }
}
