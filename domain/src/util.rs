//! Small shared helpers

/// Truncate a string to at most `max_chars`, appending an ellipsis when cut.
///
/// Used for log previews of questions and answers.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate_str("hello world", 5), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_str("日本語のテキスト", 3), "日本語...");
    }
}
