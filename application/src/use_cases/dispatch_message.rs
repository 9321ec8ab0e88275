//! Dispatch Message use case.
//!
//! Turns one pending message into one completed message and announces
//! completion: invoke the agent, attach the answer with a conditional store
//! update, publish exactly one notification.
//!
//! Failure policy is fail-silent at the channel: a gateway error or an
//! empty completion publishes nothing, and the client detects the stall
//! through its own timeout. The invocation environment owns retries; this
//! use case only reports success or failure per message.

use crate::ports::agent_gateway::{AgentGateway, AgentReply, GatewayError};
use crate::ports::exchange_logger::{ExchangeEvent, ExchangeLogger, NoExchangeLogger};
use crate::ports::message_store::{MessageStore, StoreError};
use crate::ports::notification_channel::{
    ChannelError, Notification, NotificationChannel, DEFAULT_TOPIC,
};
use courier_domain::util::truncate_str;
use courier_domain::{MemoryId, Message, MessageId, Question, SessionId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// One message to dispatch, as recovered from a store record or a change
/// event.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub id: MessageId,
    pub question: Question,
    pub session_id: SessionId,
    pub memory_id: Option<MemoryId>,
}

impl From<&Message> for DispatchRequest {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            question: message.question.clone(),
            session_id: message.session_id.clone(),
            memory_id: message.memory_id.clone(),
        }
    }
}

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Answer persisted and announced.
    Completed {
        answer: String,
        memory_id: Option<MemoryId>,
    },
    /// Agent returned no content. Nothing persisted, nothing published;
    /// the record stays pending.
    Skipped,
}

/// Use case for dispatching one pending message.
///
/// Each invocation handles exactly one message and keeps no state across
/// invocations; all shared state lives in the message store. No lock is
/// held while the agent call is in flight; the record is simply pending.
pub struct DispatchMessageUseCase {
    gateway: Arc<dyn AgentGateway>,
    store: Arc<dyn MessageStore>,
    channel: Arc<dyn NotificationChannel>,
    exchange_logger: Arc<dyn ExchangeLogger>,
    topic: String,
}

impl DispatchMessageUseCase {
    pub fn new(
        gateway: Arc<dyn AgentGateway>,
        store: Arc<dyn MessageStore>,
        channel: Arc<dyn NotificationChannel>,
    ) -> Self {
        Self {
            gateway,
            store,
            channel,
            exchange_logger: Arc::new(NoExchangeLogger),
            topic: DEFAULT_TOPIC.to_string(),
        }
    }

    /// Publish notifications on a non-default topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Create with an exchange logger.
    pub fn with_exchange_logger(mut self, logger: Arc<dyn ExchangeLogger>) -> Self {
        self.exchange_logger = logger;
        self
    }

    /// Dispatch one message: invoke the agent, persist the answer, announce.
    pub async fn execute(&self, request: DispatchRequest) -> Result<DispatchOutcome, DispatchError> {
        info!(
            id = %request.id,
            session = %request.session_id,
            "Dispatching: {}",
            truncate_str(request.question.content(), 80)
        );

        let reply = match self
            .gateway
            .invoke(
                request.question.content(),
                &request.session_id,
                request.memory_id.as_ref(),
            )
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                // No notification on failure. The record stays pending and
                // the client's timeout is the user-facing error path.
                warn!(id = %request.id, error = %e, "Agent invocation failed");
                return Err(e.into());
            }
        };

        let (answer, memory_id) = match reply {
            AgentReply::Completion { answer, memory_id } => (answer, memory_id),
            AgentReply::Empty { .. } => {
                warn!(id = %request.id, "Agent returned no content, skipping notification");
                return Ok(DispatchOutcome::Skipped);
            }
        };

        // Conditional update: fails loudly if the record was never stored,
        // which covers the trigger racing the insert.
        self.store.update_answer(&request.id, &answer).await?;

        self.channel
            .publish(
                &self.topic,
                Notification {
                    id: request.id.clone(),
                    session_id: request.session_id.clone(),
                    answer: answer.clone(),
                },
            )
            .await?;

        debug!(id = %request.id, bytes = answer.len(), "Answer persisted and announced");

        self.exchange_logger.log(ExchangeEvent::new(
            "answer_completed",
            serde_json::json!({
                "id": request.id,
                "session_id": request.session_id,
                "answer": answer,
                "memory_id": memory_id,
            }),
        ));

        Ok(DispatchOutcome::Completed { answer, memory_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{MemoryStoreFake, RecordingChannel, ScriptedGateway};

    fn pending(id: &str, session: &str, question: &str, memory: Option<&str>) -> Message {
        Message::pending_with_id(
            MessageId::new(id),
            SessionId::new(session),
            Question::try_new(question).unwrap(),
            memory.map(MemoryId::new),
        )
    }

    fn use_case(
        gateway: Arc<ScriptedGateway>,
        store: Arc<MemoryStoreFake>,
        channel: Arc<RecordingChannel>,
    ) -> DispatchMessageUseCase {
        DispatchMessageUseCase::new(gateway, store, channel)
    }

    #[tokio::test]
    async fn test_dispatch_persists_and_announces() {
        let gateway = Arc::new(ScriptedGateway::new(vec![ScriptedGateway::completion(
            "hi",
            Some("tok1"),
        )]));
        let store = Arc::new(MemoryStoreFake::new());
        let channel = Arc::new(RecordingChannel::new());

        let message = pending("m1", "s1", "hello", None);
        store.seed(message.clone());

        let outcome = use_case(gateway, store.clone(), channel.clone())
            .execute(DispatchRequest::from(&message))
            .await
            .unwrap();

        match outcome {
            DispatchOutcome::Completed { answer, memory_id } => {
                assert_eq!(answer, "hi");
                assert_eq!(memory_id.unwrap().as_str(), "tok1");
            }
            DispatchOutcome::Skipped => panic!("Expected Completed"),
        }

        // Stored answer matches the announced one
        let stored = store.get(&MessageId::new("m1")).await.unwrap();
        assert_eq!(stored.answer.as_deref(), Some("hi"));

        let published = channel.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        let (topic, n) = &published[0];
        assert_eq!(topic, DEFAULT_TOPIC);
        assert_eq!(n.id.as_str(), "m1");
        assert_eq!(n.session_id.as_str(), "s1");
        assert_eq!(n.answer, "hi");
    }

    #[tokio::test]
    async fn test_empty_reply_skips_without_error() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(AgentReply::Empty {
            memory_id: None,
        })]));
        let store = Arc::new(MemoryStoreFake::new());
        let channel = Arc::new(RecordingChannel::new());

        let message = pending("m1", "s1", "hello", None);
        store.seed(message.clone());

        let outcome = use_case(gateway, store.clone(), channel.clone())
            .execute(DispatchRequest::from(&message))
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Skipped);
        assert_eq!(channel.published_count(), 0);

        // Record remains pending
        let stored = store.get(&MessageId::new("m1")).await.unwrap();
        assert!(stored.answer.is_none());
    }

    #[tokio::test]
    async fn test_gateway_failure_publishes_nothing() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Err(GatewayError::Timeout)]));
        let store = Arc::new(MemoryStoreFake::new());
        let channel = Arc::new(RecordingChannel::new());

        let message = pending("m1", "s1", "hello", None);
        store.seed(message.clone());

        let result = use_case(gateway, store.clone(), channel.clone())
            .execute(DispatchRequest::from(&message))
            .await;

        assert!(matches!(
            result.unwrap_err(),
            DispatchError::Gateway(GatewayError::Timeout)
        ));
        assert_eq!(channel.published_count(), 0);
        let stored = store.get(&MessageId::new("m1")).await.unwrap();
        assert!(stored.answer.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_message_fails_loudly() {
        let gateway = Arc::new(ScriptedGateway::new(vec![ScriptedGateway::completion(
            "hi", None,
        )]));
        let store = Arc::new(MemoryStoreFake::new());
        let channel = Arc::new(RecordingChannel::new());

        // Not seeded: the conditional update must refuse to upsert.
        let message = pending("ghost", "s1", "hello", None);

        let result = use_case(gateway, store, channel.clone())
            .execute(DispatchRequest::from(&message))
            .await;

        assert!(matches!(
            result.unwrap_err(),
            DispatchError::Store(StoreError::NotFound(_))
        ));
        assert_eq!(channel.published_count(), 0);
    }

    #[tokio::test]
    async fn test_continuation_token_forwarded() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            ScriptedGateway::completion("hi", Some("tok1")),
            ScriptedGateway::completion("again", Some("tok2")),
        ]));
        let store = Arc::new(MemoryStoreFake::new());
        let channel = Arc::new(RecordingChannel::new());
        let use_case = use_case(gateway.clone(), store.clone(), channel);

        let first = pending("m1", "s1", "hello", None);
        store.seed(first.clone());
        let outcome = use_case.execute(DispatchRequest::from(&first)).await.unwrap();
        let token = match outcome {
            DispatchOutcome::Completed { memory_id, .. } => memory_id.unwrap(),
            DispatchOutcome::Skipped => panic!("Expected Completed"),
        };

        // Next exchange in the session reuses the token
        let second = pending("m2", "s1", "and then?", Some(token.as_str()));
        store.seed(second.clone());
        use_case.execute(DispatchRequest::from(&second)).await.unwrap();

        let invocations = gateway.invocations.lock().unwrap();
        assert_eq!(invocations.len(), 2);
        assert!(invocations[0].2.is_none());
        assert_eq!(invocations[1].2.as_ref().unwrap().as_str(), "tok1");
    }
}
