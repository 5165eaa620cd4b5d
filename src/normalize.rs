//! # Text normalization
//!
//! Turns raw user text and intent patterns into the token string the matcher
//! vectorizes: lowercase, word tokens only, English stop-words and
//! single-character tokens removed, joined with single spaces.
//!
//! Normalization is pure and deterministic, and it is **idempotent**:
//! normalizing already-normalized text returns it unchanged. Input with no
//! content-bearing tokens normalizes to the empty string; that is not an
//! error, it simply means the query carries no matchable signal.

use once_cell::sync::Lazy;
use regex::Regex;

/// Common English stop-words dropped during normalization.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "can", "do", "for", "from", "had",
    "has", "have", "he", "how", "i", "in", "is", "it", "its", "me", "my", "of", "on", "or", "so",
    "that", "the", "they", "this", "to", "was", "were", "what", "when", "where", "which", "who",
    "why", "will", "with", "you", "your",
];

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9_']+").expect("valid word regex"));

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Normalize raw text into a token string for vectorization.
///
/// # Parameters
/// - `text`: Arbitrary input text.
///
/// # Returns
/// Lowercased content tokens joined by single spaces; empty string when
/// nothing content-bearing remains.
///
/// # Examples
/// ```
/// use techbot::normalize::normalize;
///
/// assert_eq!(normalize("What is Rust?"), "rust");
/// assert_eq!(normalize("the and or"), "");
/// ```
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| t.len() > 1 && !is_stop_word(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokenize already-raw text directly into normalized tokens.
///
/// Equivalent to splitting [`normalize`] output on spaces, without the
/// intermediate string.
pub fn tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| t.len() > 1 && !is_stop_word(t))
        .map(|t| t.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        assert_eq!(normalize("Hello, World!"), "hello world");
        assert_eq!(normalize("What's a  TCP/IP stack?"), "what's tcp ip stack");
    }

    #[test]
    fn test_drops_stop_words_and_short_tokens() {
        assert_eq!(normalize("how do I read a file"), "read file");
        assert_eq!(normalize("x y z"), "");
    }

    #[test]
    fn test_content_free_input_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("?!-- ..."), "");
        assert_eq!(normalize("the and or but"), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Hello, World!",
            "How do I install Rust on Linux?",
            "what's a TCP/IP stack?",
            "",
            "the and or",
        ];
        for raw in samples {
            let once = normalize(raw);
            let twice = normalize(&once);
            assert_eq!(once, twice, "normalize not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_tokens_matches_normalize() {
        let raw = "How do I read a file in Rust?";
        assert_eq!(tokens(raw).join(" "), normalize(raw));
    }
}
