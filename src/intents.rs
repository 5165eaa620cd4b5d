//! # Intent corpus
//!
//! Loading and validation of the JSON intent file that trains the matcher.
//!
//! The on-disk format is an object with a single `intents` key:
//!
//! ```json
//! {
//!   "intents": [
//!     {
//!       "tag": "greeting",
//!       "patterns": ["hi", "hello there", "good morning"],
//!       "responses": ["Hello!", "Hi, what can I help you with?"],
//!       "dynamic": false
//!     }
//!   ]
//! }
//! ```
//!
//! An intent is **usable** only when it has at least one pattern and at least
//! one response; unusable intents are skipped with a warning rather than
//! failing the whole load. Duplicate tags are a hard error because the tag is
//! the key that routes a matched pattern to its response set.
//!
//! The loaded [`IntentSet`] is read-only. Re-training the matcher after an
//! edit means calling [`IntentSet::load`] again and building a fresh
//! [`crate::matcher::Matcher`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fs;
use std::path::Path;

use tracing::warn;

/// A named category of user request with example phrasings and candidate replies.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Intent {
    /// Unique name of this intent (e.g. `"greeting"`).
    pub tag: String,

    /// Example phrasings used to train the matcher. Order matters: it
    /// determines tie-breaking between equally similar patterns.
    pub patterns: Vec<String>,

    /// Candidate replies; one is chosen uniformly at random on a match.
    pub responses: Vec<String>,

    /// When `true`, a match on this intent is answered by the remote
    /// chat-completion API instead of a canned response.
    #[serde(default)]
    pub dynamic: bool,
}

/// Wire format of the intent file.
#[derive(Debug, Deserialize)]
struct IntentFile {
    intents: Vec<Intent>,
}

/// The validated, read-only intent collection.
#[derive(Debug, Clone, Default)]
pub struct IntentSet {
    intents: Vec<Intent>,
}

impl IntentSet {
    /// Load and validate an intent corpus from a JSON file.
    ///
    /// Intents with no patterns or no responses are unusable and are dropped
    /// with a `tracing` warning. Duplicate tags are rejected outright.
    ///
    /// # Parameters
    /// - `path`: Path to the JSON intent file.
    ///
    /// # Returns
    /// The validated `IntentSet` (possibly empty).
    ///
    /// # Errors
    /// - The file cannot be read.
    /// - The JSON does not match the expected shape.
    /// - Two intents share a tag.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let content = fs::read_to_string(path.as_ref())?;
        let file: IntentFile = serde_json::from_str(&content)?;
        Self::from_intents(file.intents)
    }

    /// Build a validated `IntentSet` from in-memory intents.
    ///
    /// Applies the same validation as [`IntentSet::load`]; useful for tests
    /// and for callers that assemble a corpus programmatically.
    pub fn from_intents(intents: Vec<Intent>) -> Result<Self, Box<dyn Error>> {
        let mut seen = HashSet::new();
        let mut usable = Vec::with_capacity(intents.len());

        for intent in intents {
            if !seen.insert(intent.tag.clone()) {
                return Err(format!("duplicate intent tag: {}", intent.tag).into());
            }
            if intent.patterns.is_empty() || intent.responses.is_empty() {
                warn!(
                    "Skipping unusable intent '{}' ({} patterns, {} responses)",
                    intent.tag,
                    intent.patterns.len(),
                    intent.responses.len()
                );
                continue;
            }
            usable.push(intent);
        }

        Ok(Self { intents: usable })
    }

    /// All usable intents, in file order.
    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    /// Number of usable intents.
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// `true` when no usable intent survived validation.
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Look up an intent by tag.
    pub fn get(&self, tag: &str) -> Option<&Intent> {
        self.intents.iter().find(|i| i.tag == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn intent(tag: &str, patterns: &[&str], responses: &[&str]) -> Intent {
        Intent {
            tag: tag.to_string(),
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
            responses: responses.iter().map(|s| s.to_string()).collect(),
            dynamic: false,
        }
    }

    #[test]
    fn test_load_valid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            r#"{{
  "intents": [
    {{"tag": "greeting", "patterns": ["hi", "hello"], "responses": ["Hello!"]}},
    {{"tag": "llm", "patterns": ["ask the model"], "responses": ["..."], "dynamic": true}}
  ]
}}"#
        )
        .unwrap();

        let set = IntentSet::load(temp_file.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.intents()[0].tag, "greeting");
        assert!(!set.intents()[0].dynamic);
        assert!(set.intents()[1].dynamic);
    }

    #[test]
    fn test_load_missing_file() {
        let set = IntentSet::load("non/existent/intents.json");
        assert!(set.is_err());
    }

    #[test]
    fn test_load_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "not json at all").unwrap();
        assert!(IntentSet::load(temp_file.path()).is_err());
    }

    #[test]
    fn test_duplicate_tags_rejected() {
        let set = IntentSet::from_intents(vec![
            intent("t", &["a"], &["b"]),
            intent("t", &["c"], &["d"]),
        ]);
        assert!(set.is_err());
    }

    #[test]
    fn test_unusable_intents_skipped() {
        let set = IntentSet::from_intents(vec![
            intent("no_patterns", &[], &["r"]),
            intent("no_responses", &["p"], &[]),
            intent("ok", &["p"], &["r"]),
        ])
        .unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.get("ok").is_some());
        assert!(set.get("no_patterns").is_none());
    }

    #[test]
    fn test_empty_corpus_is_ok() {
        let set = IntentSet::from_intents(vec![]).unwrap();
        assert!(set.is_empty());
    }
}
