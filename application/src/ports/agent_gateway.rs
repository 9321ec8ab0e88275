//! Agent gateway port
//!
//! Defines the single-shot request/response interface over the external
//! agent-invocation service.

use async_trait::async_trait;
use courier_domain::{MemoryId, SessionId};
use thiserror::Error;

/// Errors that can occur during agent gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Result of one agent invocation.
///
/// `Empty` is the explicit no-content marker: the call succeeded but the
/// agent produced nothing. It is distinct from [`GatewayError`] so the
/// dispatcher can skip notification without treating it as a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    Completion {
        answer: String,
        memory_id: Option<MemoryId>,
    },
    Empty {
        memory_id: Option<MemoryId>,
    },
}

impl AgentReply {
    /// The answer text, if the agent produced one.
    pub fn answer(&self) -> Option<&str> {
        match self {
            AgentReply::Completion { answer, .. } => Some(answer),
            AgentReply::Empty { .. } => None,
        }
    }

    /// The continuation token for the session's next exchange, if any.
    pub fn memory_id(&self) -> Option<&MemoryId> {
        match self {
            AgentReply::Completion { memory_id, .. } | AgentReply::Empty { memory_id } => {
                memory_id.as_ref()
            }
        }
    }
}

/// Gateway to the external agent.
///
/// Implementations must fully drain any streaming transport into one
/// concatenated answer before returning; interim stream events are an
/// implementation detail that never surfaces upward. The gateway does not
/// retry; retry policy belongs to the caller's invocation environment.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Ask the agent one question within a session.
    ///
    /// `memory_id` is the continuation token from the session's previous
    /// exchange; `None` on a session's first exchange.
    async fn invoke(
        &self,
        question: &str,
        session_id: &SessionId,
        memory_id: Option<&MemoryId>,
    ) -> Result<AgentReply, GatewayError>;
}
