//! Shared port fakes for use-case tests.

use crate::ports::agent_gateway::{AgentGateway, AgentReply, GatewayError};
use crate::ports::message_store::{MessageStore, StoreError};
use crate::ports::notification_channel::{ChannelError, Notification, NotificationChannel, NotificationStream};
use async_trait::async_trait;
use courier_domain::{MemoryId, Message, MessageId, SessionId};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// In-memory [`MessageStore`] with the port's conditional semantics.
pub struct MemoryStoreFake {
    messages: Mutex<HashMap<MessageId, Message>>,
}

impl MemoryStoreFake {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(HashMap::new()),
        }
    }

    /// Seed a message directly, bypassing create checks.
    pub fn seed(&self, message: Message) {
        self.messages
            .lock()
            .unwrap()
            .insert(message.id.clone(), message);
    }
}

#[async_trait]
impl MessageStore for MemoryStoreFake {
    async fn create(&self, message: Message) -> Result<(), StoreError> {
        let mut messages = self.messages.lock().unwrap();
        if messages.contains_key(&message.id) {
            return Err(StoreError::AlreadyExists(message.id));
        }
        messages.insert(message.id.clone(), message);
        Ok(())
    }

    async fn get(&self, id: &MessageId) -> Result<Message, StoreError> {
        self.messages
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn update_answer(&self, id: &MessageId, answer: &str) -> Result<(), StoreError> {
        let mut messages = self.messages.lock().unwrap();
        match messages.get_mut(id) {
            Some(message) => {
                message.answer = Some(answer.to_string());
                Ok(())
            }
            None => Err(StoreError::NotFound(id.clone())),
        }
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Message>, StoreError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .values()
            .filter(|m| &m.session_id == session_id)
            .cloned()
            .collect())
    }
}

/// Scripted [`AgentGateway`] that pops pre-seeded replies and records the
/// arguments of every invocation.
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<AgentReply, GatewayError>>>,
    pub invocations: Mutex<Vec<(String, SessionId, Option<MemoryId>)>>,
}

impl ScriptedGateway {
    pub fn new(replies: Vec<Result<AgentReply, GatewayError>>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(replies)),
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn completion(answer: &str, memory_id: Option<&str>) -> Result<AgentReply, GatewayError> {
        Ok(AgentReply::Completion {
            answer: answer.to_string(),
            memory_id: memory_id.map(MemoryId::new),
        })
    }
}

#[async_trait]
impl AgentGateway for ScriptedGateway {
    async fn invoke(
        &self,
        question: &str,
        session_id: &SessionId,
        memory_id: Option<&MemoryId>,
    ) -> Result<AgentReply, GatewayError> {
        self.invocations.lock().unwrap().push((
            question.to_string(),
            session_id.clone(),
            memory_id.cloned(),
        ));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Other("no scripted reply".to_string())))
    }
}

/// [`NotificationChannel`] that records published events.
pub struct RecordingChannel {
    pub published: Mutex<Vec<(String, Notification)>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn published_count(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn publish(&self, topic: &str, notification: Notification) -> Result<(), ChannelError> {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), notification));
        Ok(())
    }

    async fn subscribe(&self, _topic: &str) -> Result<NotificationStream, ChannelError> {
        let (_tx, rx) = tokio::sync::mpsc::channel(1);
        Ok(NotificationStream::new(rx))
    }
}
