//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for answers
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Formatted question/answer output
    Text,
    /// The full message record as JSON
    Json,
}

/// CLI arguments for courier
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(author, version, about = "Session-scoped chat dispatcher for a managed agent")]
#[command(long_about = r#"
Courier relays questions to a managed agent and correlates the answers back
to the originating chat session.

Each question is persisted as a pending message, dispatched to the agent,
completed with the agent's answer, and announced on a notification topic
that the client filters by session id.

Configuration files are loaded from (in priority order):
1. --config <path>    Explicit config file
2. ./courier.toml     Project-level config
3. ~/.config/courier/config.toml   Global config

Example:
  courier "How do I rotate the service credentials?"
  courier --chat
  courier --session support-42 "Summarize the last deployment"
  courier --get msg-0001763405516812-00000042
"#)]
pub struct Cli {
    /// The question to dispatch (not required in chat mode)
    pub question: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Fetch a stored message by id instead of asking a question
    #[arg(long, value_name = "ID", conflicts_with = "question")]
    pub get: Option<String>,

    /// Session id to continue; a fresh one is generated when omitted
    #[arg(short, long, value_name = "ID")]
    pub session: Option<String>,

    /// Continuation token from the session's previous exchange
    #[arg(long, value_name = "TOKEN")]
    pub memory: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,
}
