//! # Similarity matcher
//!
//! TF-IDF vector-space matching of user queries against intent patterns.
//!
//! [`Matcher::train`] consumes the full [`IntentSet`] once and produces a
//! fixed model: one global vocabulary, smoothed inverse document frequencies,
//! and one L2-normalized TF-IDF vector per pattern, in a parallel array with
//! a pattern-index → intent-index map. The model is read-only after training;
//! it is not incrementally updatable. Re-fitting means reloading the intent
//! file and training a fresh matcher.
//!
//! At query time the input is normalized, projected into the same vector
//! space, and scored by cosine similarity against every stored pattern
//! vector. Since all vectors are L2-normalized, cosine similarity is a plain
//! dot product. The arg-max is stable: the first pattern in corpus order wins
//! ties. A score below the configured threshold yields
//! [`Reply::LowConfidence`] instead of an answer.
//!
//! ## Quick example
//! ```
//! use techbot::intents::{Intent, IntentSet};
//! use techbot::matcher::{Matcher, Reply};
//!
//! let set = IntentSet::from_intents(vec![Intent {
//!     tag: "greeting".into(),
//!     patterns: vec!["hello".into()],
//!     responses: vec!["hi".into()],
//!     dynamic: false,
//! }])
//! .unwrap();
//!
//! let matcher = Matcher::train(&set, 0.3);
//! match matcher.reply("hello") {
//!     Reply::Answer { text, .. } => assert_eq!(text, "hi"),
//!     other => panic!("expected an answer, got {other:?}"),
//! }
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::intents::IntentSet;
use crate::normalize;

/// Fallback line used when no pattern clears the similarity threshold.
pub const LOW_CONFIDENCE_REPLY: &str =
    "Hmm, I don't have an answer for that. Try asking something else.";

/// The best-scoring pattern for a query, before thresholding.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    /// Index of the winning pattern, always in `[0, pattern_count)`.
    pub pattern_idx: usize,
    /// Tag of the intent the winning pattern belongs to.
    pub tag: String,
    /// Cosine similarity of the query against the winning pattern.
    pub score: f32,
}

/// Outcome of a query after thresholding and response selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The query matched an intent with sufficient confidence.
    Answer {
        /// Tag of the matched intent.
        tag: String,
        /// A response drawn uniformly at random from the matched tag's set.
        text: String,
        /// Cosine similarity of the winning pattern.
        score: f32,
        /// Whether the matched intent is marked for remote answering.
        dynamic: bool,
    },
    /// No pattern cleared the threshold (or the corpus/query was empty).
    LowConfidence {
        /// Best similarity observed; `0.0` when nothing was comparable.
        score: f32,
    },
}

/// A trained, immutable TF-IDF model over all intent patterns.
pub struct Matcher {
    /// token → vocabulary index.
    vocab: HashMap<String, usize>,
    /// Smoothed IDF per vocabulary index: `ln((1+n)/(1+df)) + 1`.
    idf: Vec<f32>,
    /// One L2-normalized sparse vector per pattern, sorted by token index.
    pattern_vectors: Vec<Vec<(usize, f32)>>,
    /// pattern index → intent index, parallel to `pattern_vectors`.
    pattern_intents: Vec<usize>,
    /// The corpus the model was trained on.
    intents: IntentSet,
    /// Similarity below this yields [`Reply::LowConfidence`].
    threshold: f32,
}

impl Matcher {
    /// Train a matcher over every pattern in the intent set.
    ///
    /// Building the model walks the corpus exactly once: normalize each
    /// pattern, accumulate the vocabulary and document frequencies, then
    /// weight and normalize each pattern vector. Patterns that normalize to
    /// nothing keep their index (so tie-breaking and index invariants hold)
    /// but get a zero vector and can never win with a positive score.
    ///
    /// # Parameters
    /// - `intents`: The validated corpus to train on.
    /// - `threshold`: Similarity cutoff for [`Reply::LowConfidence`].
    pub fn train(intents: &IntentSet, threshold: f32) -> Self {
        let mut vocab: HashMap<String, usize> = HashMap::new();
        let mut docs: Vec<Vec<String>> = Vec::new();
        let mut pattern_intents = Vec::new();

        for (intent_idx, intent) in intents.intents().iter().enumerate() {
            for pattern in &intent.patterns {
                let toks = normalize::tokens(pattern);
                for tok in &toks {
                    let next = vocab.len();
                    vocab.entry(tok.clone()).or_insert(next);
                }
                docs.push(toks);
                pattern_intents.push(intent_idx);
            }
        }

        // Document frequency per vocabulary index.
        let mut df = vec![0usize; vocab.len()];
        for doc in &docs {
            let mut seen: Vec<usize> = doc.iter().map(|t| vocab[t]).collect();
            seen.sort_unstable();
            seen.dedup();
            for idx in seen {
                df[idx] += 1;
            }
        }

        let n = docs.len() as f32;
        let idf: Vec<f32> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0)
            .collect();

        let pattern_vectors = docs
            .iter()
            .map(|doc| weigh(doc, &vocab, &idf))
            .collect::<Vec<_>>();

        debug!(
            "Trained matcher: {} patterns, {} terms",
            pattern_vectors.len(),
            vocab.len()
        );

        Self {
            vocab,
            idf,
            pattern_vectors,
            pattern_intents,
            intents: intents.clone(),
            threshold,
        }
    }

    /// Total number of trained patterns.
    pub fn pattern_count(&self) -> usize {
        self.pattern_vectors.len()
    }

    /// The similarity threshold this matcher was trained with.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Find the best-scoring pattern for a query, without thresholding.
    ///
    /// Returns `None` only when the corpus is empty or the query is blank.
    /// A query with no vocabulary overlap still returns the stable arg-max
    /// (the first pattern) with a score of `0.0`, so the returned
    /// `pattern_idx` is always in `[0, pattern_count)`.
    pub fn best_match(&self, query: &str) -> Option<PatternMatch> {
        if self.pattern_vectors.is_empty() || query.trim().is_empty() {
            return None;
        }

        let query_vector = weigh(&normalize::tokens(query), &self.vocab, &self.idf);

        let mut best_idx = 0usize;
        let mut best_score = f32::NEG_INFINITY;
        for (idx, pattern_vector) in self.pattern_vectors.iter().enumerate() {
            let score = dot(&query_vector, pattern_vector);
            // Strict comparison keeps the first occurrence on ties.
            if score > best_score {
                best_idx = idx;
                best_score = score;
            }
        }

        let intent = &self.intents.intents()[self.pattern_intents[best_idx]];
        Some(PatternMatch {
            pattern_idx: best_idx,
            tag: intent.tag.clone(),
            score: best_score,
        })
    }

    /// Answer a query: threshold the best match and pick a response.
    ///
    /// On a confident match the response text is chosen uniformly at random
    /// from the matched tag's response set, and never from any other tag's.
    pub fn reply(&self, query: &str) -> Reply {
        match self.best_match(query) {
            Some(m) if m.score >= self.threshold => {
                let intent = &self.intents.intents()[self.pattern_intents[m.pattern_idx]];
                let text = intent.responses[fastrand::usize(..intent.responses.len())].clone();
                Reply::Answer {
                    tag: m.tag,
                    text,
                    score: m.score,
                    dynamic: intent.dynamic,
                }
            }
            Some(m) => Reply::LowConfidence { score: m.score },
            None => Reply::LowConfidence { score: 0.0 },
        }
    }
}

/// Build an L2-normalized sparse TF-IDF vector for one token list.
///
/// Tokens outside the vocabulary are ignored; an empty projection yields an
/// empty (zero) vector. Entries are sorted by vocabulary index so that
/// [`dot`] can merge two vectors in one pass.
fn weigh(tokens: &[String], vocab: &HashMap<String, usize>, idf: &[f32]) -> Vec<(usize, f32)> {
    let mut counts: HashMap<usize, f32> = HashMap::new();
    for tok in tokens {
        if let Some(&idx) = vocab.get(tok) {
            *counts.entry(idx).or_insert(0.0) += 1.0;
        }
    }

    let mut entries: Vec<(usize, f32)> = counts
        .into_iter()
        .map(|(idx, tf)| (idx, tf * idf[idx]))
        .collect();
    entries.sort_unstable_by_key(|&(idx, _)| idx);

    let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for entry in &mut entries {
            entry.1 /= norm;
        }
    }
    entries
}

/// Dot product of two index-sorted sparse vectors.
fn dot(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
    let (mut i, mut j, mut sum) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intents::Intent;

    fn intent(tag: &str, patterns: &[&str], responses: &[&str]) -> Intent {
        Intent {
            tag: tag.to_string(),
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
            responses: responses.iter().map(|s| s.to_string()).collect(),
            dynamic: false,
        }
    }

    fn single_intent_matcher() -> Matcher {
        let set = IntentSet::from_intents(vec![intent("t", &["hello"], &["hi"])]).unwrap();
        Matcher::train(&set, 0.3)
    }

    #[test]
    fn test_exact_pattern_matches() {
        let matcher = single_intent_matcher();
        match matcher.reply("hello") {
            Reply::Answer { tag, text, score, .. } => {
                assert_eq!(tag, "t");
                assert_eq!(text, "hi");
                assert!(score > 0.99);
            }
            other => panic!("expected answer, got {other:?}"),
        }
    }

    #[test]
    fn test_unrelated_query_is_low_confidence() {
        let matcher = single_intent_matcher();
        match matcher.reply("zzz completely unrelated") {
            Reply::LowConfidence { score } => assert!(score < 0.3),
            other => panic!("expected low confidence, got {other:?}"),
        }
    }

    #[test]
    fn test_threshold_is_the_trained_value() {
        let set = IntentSet::from_intents(vec![intent("t", &["hello"], &["hi"])]).unwrap();
        let matcher = Matcher::train(&set, 0.5);
        assert_eq!(matcher.threshold(), 0.5);
        // A borderline score below the trained threshold must not answer.
        assert!(matches!(
            Matcher::train(&set, 2.0).reply("hello"),
            Reply::LowConfidence { .. }
        ));
    }

    #[test]
    fn test_empty_corpus_never_answers() {
        let set = IntentSet::from_intents(vec![]).unwrap();
        let matcher = Matcher::train(&set, 0.3);
        assert!(matcher.best_match("hello").is_none());
        assert_eq!(matcher.reply("hello"), Reply::LowConfidence { score: 0.0 });
    }

    #[test]
    fn test_blank_query_is_low_confidence() {
        let matcher = single_intent_matcher();
        assert!(matcher.best_match("   ").is_none());
        assert_eq!(matcher.reply("   "), Reply::LowConfidence { score: 0.0 });
    }

    #[test]
    fn test_match_index_in_bounds() {
        let set = IntentSet::from_intents(vec![
            intent("a", &["install rust", "rust toolchain setup"], &["r1"]),
            intent("b", &["python virtualenv", "pip install"], &["r2"]),
        ])
        .unwrap();
        let matcher = Matcher::train(&set, 0.3);
        let queries = ["install rust", "pip", "zzz nothing shared", "rust pip"];
        for q in queries {
            let m = matcher.best_match(q).expect("non-empty query must match");
            assert!(m.pattern_idx < matcher.pattern_count());
        }
    }

    #[test]
    fn test_tie_resolves_to_first_pattern() {
        // Identical pattern text under two tags: equal cosine, first wins.
        let set = IntentSet::from_intents(vec![
            intent("first", &["reset password"], &["r1"]),
            intent("second", &["reset password"], &["r2"]),
        ])
        .unwrap();
        let matcher = Matcher::train(&set, 0.3);
        let m = matcher.best_match("reset password").unwrap();
        assert_eq!(m.pattern_idx, 0);
        assert_eq!(m.tag, "first");
    }

    #[test]
    fn test_response_drawn_only_from_matched_tag() {
        let set = IntentSet::from_intents(vec![
            intent("greet", &["hello there"], &["hi!", "hey!", "howdy!"]),
            intent("bye", &["goodbye"], &["see you"]),
        ])
        .unwrap();
        let matcher = Matcher::train(&set, 0.3);
        for _ in 0..32 {
            match matcher.reply("hello there") {
                Reply::Answer { tag, text, .. } => {
                    assert_eq!(tag, "greet");
                    assert!(["hi!", "hey!", "howdy!"].contains(&text.as_str()));
                }
                other => panic!("expected answer, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_shared_vocabulary_prefers_closer_pattern() {
        let set = IntentSet::from_intents(vec![
            intent("rust", &["how do I install rust"], &["rustup"]),
            intent("python", &["how do I install python"], &["pyenv"]),
        ])
        .unwrap();
        let matcher = Matcher::train(&set, 0.1);
        match matcher.reply("install python please") {
            Reply::Answer { tag, .. } => assert_eq!(tag, "python"),
            other => panic!("expected answer, got {other:?}"),
        }
    }

    #[test]
    fn test_dynamic_flag_survives_matching() {
        let mut llm = intent("llm", &["ask the model something"], &["placeholder"]);
        llm.dynamic = true;
        let set = IntentSet::from_intents(vec![llm]).unwrap();
        let matcher = Matcher::train(&set, 0.3);
        match matcher.reply("ask the model something") {
            Reply::Answer { dynamic, .. } => assert!(dynamic),
            other => panic!("expected answer, got {other:?}"),
        }
    }
}
