//! Client-side correlation state machine
//!
//! Tracks each submitted question through
//! `Submitted -> AwaitingAnswer -> Answered` and reconciles incoming
//! notifications against the pending set. The backend never sends a
//! negative acknowledgment, so a client-side timeout synthesizing a local
//! error answer is the only user-facing failure path.

use courier_application::ports::notification_channel::Notification;
use courier_domain::{MemoryId, Message, MessageId, SessionId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Placeholder answer shown when no notification arrived in time.
const TIMEOUT_ANSWER: &str =
    "Error generating an answer. Check the dispatcher logs and the agent configuration, then try again.";

/// Placeholder shown when a notification references a question this client
/// no longer tracks (local state lost, e.g. after a reload).
const UNKNOWN_MESSAGE_ANSWER: &str =
    "Received an answer for a question this session no longer tracks. Local chat state may have been lost.";

/// One completed entry in the local chat history.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatExchange {
    pub question: String,
    pub answer: String,
    pub is_error: bool,
}

/// What [`ClientCorrelator::handle_notification`] did with an event.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationOutcome {
    /// Matched a pending question; it moved to the history.
    Answered(MessageId),
    /// Event belongs to another session; dropped without a trace.
    DiscardedOtherSession,
    /// Event references an id this client never tracked; an error
    /// placeholder was appended so the inconsistency is visible.
    UnknownMessage(MessageId),
}

struct PendingQuestion {
    question: String,
    submitted_at: Instant,
}

/// Client-side correlator for one chat window.
///
/// Holds the active session id, the pending questions and the completed
/// history. Pure state: the caller feeds it notifications and clock
/// readings, which keeps every transition unit-testable.
pub struct ClientCorrelator {
    session_id: SessionId,
    memory_id: Option<MemoryId>,
    pending: HashMap<MessageId, PendingQuestion>,
    history: Vec<ChatExchange>,
    answer_timeout: Duration,
}

impl ClientCorrelator {
    /// Start a correlator with a fresh session id.
    pub fn new(answer_timeout: Duration) -> Self {
        Self {
            session_id: SessionId::generate(),
            memory_id: None,
            pending: HashMap::new(),
            history: Vec::new(),
            answer_timeout,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Continuation token to send with the next question.
    pub fn memory_id(&self) -> Option<&MemoryId> {
        self.memory_id.as_ref()
    }

    /// Record the token produced by the latest completed exchange.
    pub fn set_memory_id(&mut self, memory_id: Option<MemoryId>) {
        if memory_id.is_some() {
            self.memory_id = memory_id;
        }
    }

    pub fn history(&self) -> &[ChatExchange] {
        &self.history
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Track a submitted message as awaiting its answer.
    ///
    /// Call after the store write succeeded. The caller must not submit a
    /// second question for the session while one is pending; the
    /// continuation token makes exchanges sequentially dependent.
    pub fn track(&mut self, message: &Message, now: Instant) {
        self.pending.insert(
            message.id.clone(),
            PendingQuestion {
                question: message.question.content().to_string(),
                submitted_at: now,
            },
        );
    }

    /// Reconcile one incoming notification.
    pub fn handle_notification(&mut self, notification: &Notification) -> NotificationOutcome {
        if notification.session_id != self.session_id {
            return NotificationOutcome::DiscardedOtherSession;
        }

        match self.pending.remove(&notification.id) {
            Some(pending) => {
                self.history.push(ChatExchange {
                    question: pending.question,
                    answer: notification.answer.clone(),
                    is_error: false,
                });
                NotificationOutcome::Answered(notification.id.clone())
            }
            None => {
                self.history.push(ChatExchange {
                    question: format!("[unknown message {}]", notification.id),
                    answer: UNKNOWN_MESSAGE_ANSWER.to_string(),
                    is_error: true,
                });
                NotificationOutcome::UnknownMessage(notification.id.clone())
            }
        }
    }

    /// Give up on one pending question, appending the error placeholder.
    ///
    /// Returns false if the id was not pending.
    pub fn fail(&mut self, id: &MessageId) -> bool {
        match self.pending.remove(id) {
            Some(pending) => {
                self.history.push(ChatExchange {
                    question: pending.question,
                    answer: TIMEOUT_ANSWER.to_string(),
                    is_error: true,
                });
                true
            }
            None => false,
        }
    }

    /// Expire every pending question older than the answer timeout.
    ///
    /// Returns the expired ids. The dispatcher may still complete such a
    /// question later; its late notification then surfaces through the
    /// unknown-message path rather than being silently dropped.
    pub fn expire(&mut self, now: Instant) -> Vec<MessageId> {
        let expired: Vec<MessageId> = self
            .pending
            .iter()
            .filter(|(_, p)| now.duration_since(p.submitted_at) >= self.answer_timeout)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            self.fail(id);
        }
        expired
    }

    /// Clear history and start a new session.
    ///
    /// Pending questions are dropped: their notifications will target the
    /// old session id and be discarded on arrival.
    pub fn reset(&mut self) -> &SessionId {
        self.pending.clear();
        self.history.clear();
        self.memory_id = None;
        self.session_id = SessionId::generate();
        &self.session_id
    }
}
