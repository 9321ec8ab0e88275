//! Front Desk use case.
//!
//! Synchronous request surface for clients: accept a new question or fetch
//! a message by id. Each operation is a tagged variant carrying its own
//! typed parameters, handled by an exhaustive `match`; there is no
//! operation-name string to mistype.

use crate::ports::message_store::{MessageStore, StoreError};
use crate::use_cases::submit_question::{SubmitError, SubmitQuestionInput, SubmitQuestionUseCase};
use courier_domain::{Message, MessageId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while handling a chat request.
#[derive(Error, Debug)]
pub enum FrontDeskError {
    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// A client-facing chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "request_type", rename_all = "snake_case")]
pub enum ChatRequest {
    /// Submit a new question into a session.
    Ask {
        question: String,
        session_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        memory_id: Option<String>,
    },
    /// Fetch a message (pending or answered) by id.
    GetAnswer { message_id: String },
}

/// Use case handling the synchronous chat API.
pub struct FrontDesk {
    submit: SubmitQuestionUseCase,
    store: Arc<dyn MessageStore>,
}

impl FrontDesk {
    pub fn new(submit: SubmitQuestionUseCase, store: Arc<dyn MessageStore>) -> Self {
        Self { submit, store }
    }

    /// Handle one request; both variants resolve to a message record.
    pub async fn handle(&self, request: ChatRequest) -> Result<Message, FrontDeskError> {
        match request {
            ChatRequest::Ask {
                question,
                session_id,
                memory_id,
            } => {
                let mut input = SubmitQuestionInput::new(question, session_id);
                if let Some(memory_id) = memory_id {
                    input = input.with_memory_id(memory_id);
                }
                Ok(self.submit.execute(input).await?)
            }
            ChatRequest::GetAnswer { message_id } => {
                Ok(self.store.get(&MessageId::new(message_id)).await?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::MemoryStoreFake;

    fn front_desk(store: Arc<MemoryStoreFake>) -> FrontDesk {
        FrontDesk::new(SubmitQuestionUseCase::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_ask_returns_pending_message() {
        let store = Arc::new(MemoryStoreFake::new());
        let desk = front_desk(store.clone());

        let message = desk
            .handle(ChatRequest::Ask {
                question: "hello".to_string(),
                session_id: "s1".to_string(),
                memory_id: None,
            })
            .await
            .unwrap();

        assert!(message.answer.is_none());
        assert!(message.id.as_str().starts_with("msg-"));
        assert!(store.get(&message.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_answer_unknown_id_is_not_found() {
        let store = Arc::new(MemoryStoreFake::new());
        let desk = front_desk(store);

        let result = desk
            .handle(ChatRequest::GetAnswer {
                message_id: "nope".to_string(),
            })
            .await;

        assert!(matches!(
            result.unwrap_err(),
            FrontDeskError::Store(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_request_wire_format() {
        let json = r#"{"request_type":"ask","question":"hi","session_id":"s1"}"#;
        let request: ChatRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(request, ChatRequest::Ask { memory_id: None, .. }));

        let json = r#"{"request_type":"get_answer","message_id":"m1"}"#;
        let request: ChatRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(request, ChatRequest::GetAnswer { .. }));
    }
}
