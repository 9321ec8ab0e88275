//! Presentation layer for courier
//!
//! This crate contains the client-side correlation state machine, the
//! interactive chat REPL, CLI argument definitions and console output
//! formatting.

pub mod chat;
pub mod cli;
pub mod correlator;
pub mod output;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::{Cli, OutputFormat};
pub use correlator::{ChatExchange, ClientCorrelator, NotificationOutcome};
pub use output::ConsoleFormatter;
