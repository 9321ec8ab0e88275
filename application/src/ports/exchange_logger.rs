//! Port for structured exchange logging.
//!
//! Defines the [`ExchangeLogger`] trait for recording dispatch events
//! (submissions, completions, skips) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! exchange history in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured exchange event for logging.
pub struct ExchangeEvent {
    /// Event type identifier (e.g., "question_submitted", "answer_completed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ExchangeEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging exchange events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL
/// line). The `log` method is intentionally synchronous and non-fallible:
/// logging failures must never disturb the dispatch flow.
pub trait ExchangeLogger: Send + Sync {
    /// Record an exchange event.
    fn log(&self, event: ExchangeEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoExchangeLogger;

impl ExchangeLogger for NoExchangeLogger {
    fn log(&self, _event: ExchangeEvent) {}
}
