//! Session title derivation.
//!
//! A freshly created session is titled [`DEFAULT_SESSION_TITLE`]. The
//! first user turn replaces it with a short preview of the message.

pub use studium_types::chat::DEFAULT_SESSION_TITLE;

/// Maximum number of characters taken from the first message.
const TITLE_PREVIEW_CHARS: usize = 10;

/// Derive a session title from the first user message: the first 10
/// characters of the trimmed text. Character-based, so CJK input is not
/// split mid-codepoint. Falls back to the default title for blank input.
pub fn derive_title(first_message: &str) -> String {
    let title: String = first_message.trim().chars().take(TITLE_PREVIEW_CHARS).collect();
    if title.is_empty() {
        DEFAULT_SESSION_TITLE.to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_kept_whole() {
        assert_eq!(derive_title("hello"), "hello");
    }

    #[test]
    fn test_long_message_truncated_to_ten_chars() {
        assert_eq!(derive_title("what is the borrow checker"), "what is th");
    }

    #[test]
    fn test_truncation_is_character_based() {
        // 12 CJK characters -> first 10, not a byte-length prefix.
        assert_eq!(derive_title("请解释一下所有权和借用机制"), "请解释一下所有权和借");
    }

    #[test]
    fn test_leading_whitespace_trimmed() {
        assert_eq!(derive_title("   rust?   "), "rust?");
    }

    #[test]
    fn test_blank_message_falls_back_to_default() {
        assert_eq!(derive_title("   "), DEFAULT_SESSION_TITLE);
        assert_eq!(derive_title(""), DEFAULT_SESSION_TITLE);
    }
}
