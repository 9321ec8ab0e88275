//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These cover submission-time validation only: everything that can go
/// wrong after a question is accepted surfaces through the port error
/// types (store, gateway, channel).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Session id cannot be empty")]
    EmptySessionId,
}
