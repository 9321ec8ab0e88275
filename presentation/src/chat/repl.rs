//! REPL (Read-Eval-Print Loop) for interactive chat
//!
//! Submits each line as a question, drives the dispatcher, and correlates
//! the completion notification back through the client correlator. The
//! REPL holds one open subscription for its whole lifetime and never
//! overlaps two questions in a session, since the continuation token makes
//! exchanges sequentially dependent.

use crate::correlator::{ClientCorrelator, NotificationOutcome};
use crate::output::ConsoleFormatter;
use courier_application::use_cases::dispatch_message::{
    DispatchMessageUseCase, DispatchOutcome, DispatchRequest,
};
use courier_application::use_cases::submit_question::{SubmitQuestionInput, SubmitQuestionUseCase};
use courier_application::{NotificationChannel, NotificationStream};
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Interactive chat REPL
pub struct ChatRepl {
    submit: SubmitQuestionUseCase,
    dispatch: DispatchMessageUseCase,
    channel: Arc<dyn NotificationChannel>,
    topic: String,
    answer_timeout: Duration,
    show_progress: bool,
}

impl ChatRepl {
    pub fn new(
        submit: SubmitQuestionUseCase,
        dispatch: DispatchMessageUseCase,
        channel: Arc<dyn NotificationChannel>,
        topic: impl Into<String>,
        answer_timeout: Duration,
    ) -> Self {
        Self {
            submit,
            dispatch,
            channel,
            topic: topic.into(),
            answer_timeout,
            show_progress: true,
        }
    }

    /// Set whether to show a spinner while waiting for answers
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load history
        let history_path = dirs::data_dir().map(|p| p.join("courier").join("history.txt"));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        let mut correlator = ClientCorrelator::new(self.answer_timeout);

        // One subscription per REPL lifetime
        let mut stream = match self.channel.subscribe(&self.topic).await {
            Ok(stream) => stream,
            Err(e) => {
                eprintln!("Cannot subscribe to notifications: {}", e);
                return Ok(());
            }
        };

        self.print_welcome(&correlator);

        loop {
            let readline = rl.readline(">>> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line, &mut correlator) {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    self.process_question(line, &mut correlator, &mut stream).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        stream.close();

        // Save history
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    /// Submit one question, dispatch it, and correlate the result.
    async fn process_question(
        &self,
        line: &str,
        correlator: &mut ClientCorrelator,
        stream: &mut NotificationStream,
    ) {
        let mut input =
            SubmitQuestionInput::new(line, correlator.session_id().as_str().to_string());
        if let Some(memory_id) = correlator.memory_id() {
            input = input.with_memory_id(memory_id.as_str().to_string());
        }

        let message = match self.submit.execute(input).await {
            Ok(message) => message,
            Err(e) => {
                eprintln!("Cannot submit question: {}", e);
                return;
            }
        };
        correlator.track(&message, Instant::now());

        let spinner = self.spinner();

        let outcome = self.dispatch.execute(DispatchRequest::from(&message)).await;

        match outcome {
            Ok(DispatchOutcome::Completed { memory_id, .. }) => {
                // The notification is already on the channel; wait for it
                // up to the client timeout, letting foreign events pass by.
                let deadline = Instant::now() + self.answer_timeout;
                loop {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        correlator.fail(&message.id);
                        break;
                    }
                    match tokio::time::timeout(remaining, stream.recv()).await {
                        Ok(Some(notification)) => {
                            match correlator.handle_notification(&notification) {
                                NotificationOutcome::Answered(id) if id == message.id => break,
                                _ => continue,
                            }
                        }
                        _ => {
                            correlator.fail(&message.id);
                            break;
                        }
                    }
                }
                correlator.set_memory_id(memory_id);
            }
            Ok(DispatchOutcome::Skipped) => {
                // No notification will come for an empty completion
                correlator.fail(&message.id);
            }
            Err(e) => {
                warn!(id = %message.id, error = %e, "Dispatch failed");
                correlator.fail(&message.id);
            }
        }

        correlator.expire(Instant::now());

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        if let Some(exchange) = correlator.history().last() {
            println!();
            println!("{}", ConsoleFormatter::format_exchange(exchange));
        }
    }

    fn spinner(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Waiting for the agent...");
        spinner.enable_steady_tick(Duration::from_millis(120));
        Some(spinner)
    }

    fn print_welcome(&self, correlator: &ClientCorrelator) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            Courier - Chat Mode              │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Session: {}", correlator.session_id());
        println!();
        println!("Commands:");
        println!("  /help     - Show this help");
        println!("  /history  - Show this session's exchanges");
        println!("  /clear    - Clear history and start a new session");
        println!("  /quit     - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&self, cmd: &str, correlator: &mut ClientCorrelator) -> bool {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                true
            }
            "/help" | "/h" | "/?" => {
                println!();
                println!("Commands:");
                println!("  /help, /h, /?    - Show this help");
                println!("  /history         - Show this session's exchanges");
                println!("  /clear           - Clear history and start a new session");
                println!("  /quit, /exit, /q - Exit chat");
                println!();
                false
            }
            "/history" => {
                println!();
                println!("{}", ConsoleFormatter::format_history(correlator.history()));
                false
            }
            "/clear" => {
                let session_id = correlator.reset();
                println!("History cleared. New session: {}", session_id);
                false
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }
}
