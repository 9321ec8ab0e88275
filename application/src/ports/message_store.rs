//! Message store port
//!
//! Durable keyed record of every question/answer pair. The store is the
//! single source of idempotency truth: the dispatcher never keeps an
//! in-memory guard, it relies on the store's conditional semantics.

use async_trait::async_trait;
use courier_domain::{Message, MessageId, SessionId};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Message already exists: {0}")]
    AlreadyExists(MessageId),

    #[error("Message not found: {0}")]
    NotFound(MessageId),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Keyed message storage with a secondary grouping by session.
///
/// Concurrent calls for distinct ids are safe; concurrent updates of the
/// same id are not expected and are bounded only by the conditional write.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert a new record. Fails with [`StoreError::AlreadyExists`] if the
    /// id collides.
    async fn create(&self, message: Message) -> Result<(), StoreError>;

    /// Fetch a record by id.
    async fn get(&self, id: &MessageId) -> Result<Message, StoreError>;

    /// Conditional update: attach the answer to an existing record.
    ///
    /// Fails with [`StoreError::NotFound`] if the record does not exist,
    /// never an upsert. This guards against the dispatch trigger racing the
    /// insert or firing for a message that was never stored.
    async fn update_answer(&self, id: &MessageId, answer: &str) -> Result<(), StoreError>;

    /// All messages for a session, in no particular order.
    ///
    /// Ids are time-ordered by construction, so callers sort by id to
    /// reconstruct the conversation.
    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Message>, StoreError>;
}
