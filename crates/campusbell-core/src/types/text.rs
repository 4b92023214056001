//! Small text helpers for notification payloads.

/// Truncate `text` to at most `max_chars` characters.
///
/// Counts Unicode scalar values, so multi-byte characters are never split.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_unchanged() {
        assert_eq!(truncate_chars("hello", 100), "hello");
    }

    #[test]
    fn test_truncates_to_limit() {
        let long = "a".repeat(150);
        assert_eq!(truncate_chars(&long, 100).len(), 100);
    }

    #[test]
    fn test_multibyte_boundary() {
        let text = "ééééé";
        assert_eq!(truncate_chars(text, 3), "ééé");
    }
}
