//! In-memory message store
//!
//! Keyed map plus a per-session id index, so `list_by_session` never scans
//! the whole store. Suitable for tests and single-process deployments.

use async_trait::async_trait;
use courier_application::ports::message_store::{MessageStore, StoreError};
use courier_domain::{Message, MessageId, SessionId};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    messages: HashMap<MessageId, Message>,
    by_session: HashMap<SessionId, Vec<MessageId>>,
}

/// Thread-safe in-memory [`MessageStore`].
#[derive(Default)]
pub struct MemoryMessageStore {
    inner: RwLock<Inner>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn create(&self, message: Message) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.messages.contains_key(&message.id) {
            return Err(StoreError::AlreadyExists(message.id));
        }
        inner
            .by_session
            .entry(message.session_id.clone())
            .or_default()
            .push(message.id.clone());
        inner.messages.insert(message.id.clone(), message);
        Ok(())
    }

    async fn get(&self, id: &MessageId) -> Result<Message, StoreError> {
        self.inner
            .read()
            .await
            .messages
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn update_answer(&self, id: &MessageId, answer: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.messages.get_mut(id) {
            Some(message) => {
                message.answer = Some(answer.to_string());
                Ok(())
            }
            None => Err(StoreError::NotFound(id.clone())),
        }
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Message>, StoreError> {
        let inner = self.inner.read().await;
        let ids = match inner.by_session.get(session_id) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };
        Ok(ids
            .iter()
            .filter_map(|id| inner.messages.get(id).cloned())
            .collect())
    }
}
