//! Message entity

use crate::core::question::Question;
use crate::message::value_objects::{MemoryId, MessageId, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One question/answer exchange (Entity)
///
/// A message is created pending (question set, answer absent) and the
/// answer is attached at most once by the dispatcher. `memory_id` is the
/// continuation token supplied *for* this exchange, i.e. the token the
/// previous exchange in the session produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub session_id: SessionId,
    pub question: Question,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_id: Option<MemoryId>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a pending message with a freshly minted id.
    pub fn pending(session_id: SessionId, question: Question, memory_id: Option<MemoryId>) -> Self {
        Self::pending_with_id(MessageId::generate(), session_id, question, memory_id)
    }

    /// Create a pending message with a caller-supplied id.
    pub fn pending_with_id(
        id: MessageId,
        session_id: SessionId,
        question: Question,
        memory_id: Option<MemoryId>,
    ) -> Self {
        Self {
            id,
            session_id,
            question,
            answer: None,
            memory_id,
            created_at: Utc::now(),
        }
    }

    /// Whether the dispatcher has completed this exchange.
    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str) -> Question {
        Question::try_new(text).unwrap()
    }

    #[test]
    fn test_pending_message_has_no_answer() {
        let msg = Message::pending(SessionId::new("s1"), question("hello"), None);
        assert!(!msg.is_answered());
        assert!(msg.answer.is_none());
        assert_eq!(msg.session_id.as_str(), "s1");
    }

    #[test]
    fn test_pending_with_id_keeps_caller_id() {
        let msg = Message::pending_with_id(
            MessageId::new("m1"),
            SessionId::new("s1"),
            question("hello"),
            Some(MemoryId::new("tok1")),
        );
        assert_eq!(msg.id.as_str(), "m1");
        assert_eq!(msg.memory_id.as_ref().unwrap().as_str(), "tok1");
    }

    #[test]
    fn test_absent_answer_not_serialized() {
        let msg = Message::pending(SessionId::new("s1"), question("hello"), None);
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("answer").is_none());
        assert!(json.get("memory_id").is_none());
    }
}
