//! Console output formatter

use crate::correlator::ChatExchange;
use colored::Colorize;
use courier_domain::Message;

/// Formats exchanges and message records for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format one completed exchange
    pub fn format_exchange(exchange: &ChatExchange) -> String {
        let answer = if exchange.is_error {
            exchange.answer.red().to_string()
        } else {
            exchange.answer.clone()
        };
        format!(
            "{} {}\n{} {}",
            "You:".cyan().bold(),
            exchange.question,
            "Agent:".yellow().bold(),
            answer
        )
    }

    /// Format a whole session history
    pub fn format_history(history: &[ChatExchange]) -> String {
        if history.is_empty() {
            return "No chat history".dimmed().to_string();
        }
        history
            .iter()
            .map(Self::format_exchange)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Format a message record as JSON (for `--output json`)
    pub fn format_json(message: &Message) -> String {
        serde_json::to_string_pretty(message)
            .unwrap_or_else(|e| format!("{{\"error\":\"cannot encode message: {}\"}}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_domain::{MessageId, Question, SessionId};

    #[test]
    fn test_format_history_empty() {
        let out = ConsoleFormatter::format_history(&[]);
        assert!(out.contains("No chat history"));
    }

    #[test]
    fn test_format_exchange_contains_both_sides() {
        let exchange = ChatExchange {
            question: "hello".to_string(),
            answer: "hi".to_string(),
            is_error: false,
        };
        let out = ConsoleFormatter::format_exchange(&exchange);
        assert!(out.contains("hello"));
        assert!(out.contains("hi"));
    }

    #[test]
    fn test_format_json_includes_fields() {
        let message = Message::pending_with_id(
            MessageId::new("m1"),
            SessionId::new("s1"),
            Question::try_new("hello").unwrap(),
            None,
        );
        let out = ConsoleFormatter::format_json(&message);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["id"], "m1");
        assert_eq!(value["session_id"], "s1");
    }
}
