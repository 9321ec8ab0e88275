//! Submit Question use case.
//!
//! Validates a submission, mints a time-ordered message id and persists the
//! pending record. The stored message carries no answer; completion is the
//! dispatcher's job.

use crate::ports::exchange_logger::{ExchangeEvent, ExchangeLogger, NoExchangeLogger};
use crate::ports::message_store::{MessageStore, StoreError};
use courier_domain::util::truncate_str;
use courier_domain::{DomainError, MemoryId, Message, Question, SessionId};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during submission.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Validation failed: {0}")]
    Validation(#[from] DomainError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Input for the [`SubmitQuestionUseCase`].
#[derive(Debug, Clone)]
pub struct SubmitQuestionInput {
    /// The question text. Must be non-empty.
    pub question: String,
    /// The conversation this question belongs to.
    pub session_id: String,
    /// Continuation token from the session's previous exchange, if any.
    pub memory_id: Option<String>,
}

impl SubmitQuestionInput {
    pub fn new(question: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            session_id: session_id.into(),
            memory_id: None,
        }
    }

    pub fn with_memory_id(mut self, memory_id: impl Into<String>) -> Self {
        self.memory_id = Some(memory_id.into());
        self
    }
}

/// Use case for accepting a question into the store.
pub struct SubmitQuestionUseCase {
    store: Arc<dyn MessageStore>,
    exchange_logger: Arc<dyn ExchangeLogger>,
}

impl SubmitQuestionUseCase {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self {
            store,
            exchange_logger: Arc::new(NoExchangeLogger),
        }
    }

    /// Create with an exchange logger.
    pub fn with_exchange_logger(mut self, logger: Arc<dyn ExchangeLogger>) -> Self {
        self.exchange_logger = logger;
        self
    }

    /// Validate the input and persist a pending message.
    ///
    /// Validation errors surface synchronously, before anything is stored.
    pub async fn execute(&self, input: SubmitQuestionInput) -> Result<Message, SubmitError> {
        if input.session_id.trim().is_empty() {
            return Err(DomainError::EmptySessionId.into());
        }
        let question = Question::try_new(input.question).ok_or(DomainError::EmptyQuestion)?;

        let message = Message::pending(
            SessionId::new(input.session_id),
            question,
            input.memory_id.map(MemoryId::new),
        );

        self.store.create(message.clone()).await?;

        info!(
            id = %message.id,
            session = %message.session_id,
            "Question submitted: {}",
            truncate_str(message.question.content(), 80)
        );

        self.exchange_logger.log(ExchangeEvent::new(
            "question_submitted",
            serde_json::json!({
                "id": message.id,
                "session_id": message.session_id,
                "question": message.question,
            }),
        ));

        Ok(message)
    }
}
