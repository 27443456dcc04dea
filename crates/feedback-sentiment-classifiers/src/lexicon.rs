//! Lexicon-based sentiment classifier
//!
//! Counts whole-word hits against fixed positive and negative word lists.
//! Needs no model files, so it is the backend for offline development.
//!
//! The score is the confidence of the returned label: the positive-hit
//! ratio for `POSITIVE`, one minus it for `NEGATIVE`, 0.5 for `NEUTRAL`.

use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier};
use aho_corasick::{AhoCorasick, MatchKind};
use async_trait::async_trait;
use feedback_sentiment_core::{Error, Result, FALLBACK_SCORE};
use std::time::Instant;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "wonderful", "fantastic", "awesome", "perfect",
    "love", "like", "enjoy", "happy", "satisfied", "pleased", "impressed", "helpful", "useful",
    "effective", "efficient", "fast", "quick", "easy", "simple", "intuitive", "beautiful",
    "nice", "clean", "modern", "smooth", "reliable", "stable", "secure",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "worst", "disappointing", "frustrating", "hate",
    "dislike", "annoying", "irritating", "confusing", "difficult", "hard", "slow", "buggy",
    "broken", "crash", "error", "problem", "issue", "bug", "ugly", "messy", "complicated",
    "unreliable", "unstable", "insecure", "poor",
];

/// Positive-hit ratio above which text is labelled positive
const POSITIVE_THRESHOLD: f32 = 0.6;
/// Positive-hit ratio below which text is labelled negative
const NEGATIVE_THRESHOLD: f32 = 0.4;
/// Confidence added for emphatic text (many `!` or mostly capitals)
const EMPHASIS_BOOST: f32 = 0.1;

pub struct LexiconClassifier {
    name: String,
    matcher: AhoCorasick,
    positive_patterns: usize,
}

impl LexiconClassifier {
    pub fn new() -> Result<Self> {
        Self::with_name("sentiment-lexicon")
    }

    pub fn with_name(name: impl Into<String>) -> Result<Self> {
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(POSITIVE_WORDS.iter().chain(NEGATIVE_WORDS))
            .map_err(|e| Error::classifier(format!("Failed to build sentiment matcher: {e}")))?;

        Ok(Self {
            name: name.into(),
            matcher,
            positive_patterns: POSITIVE_WORDS.len(),
        })
    }

    /// Count whole-word positive and negative hits
    fn count_hits(&self, text: &str) -> (usize, usize) {
        let bytes = text.as_bytes();
        let is_word = |byte: Option<&u8>| byte.is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_');

        self.matcher
            .find_iter(text)
            .filter(|m| {
                let before = m.start().checked_sub(1).and_then(|i| bytes.get(i));
                !is_word(before) && !is_word(bytes.get(m.end()))
            })
            .fold((0, 0), |(pos, neg), m| {
                if m.pattern().as_usize() < self.positive_patterns {
                    (pos + 1, neg)
                } else {
                    (pos, neg + 1)
                }
            })
    }
}

fn is_emphatic(text: &str) -> bool {
    let exclamations = text.matches('!').count();
    let capitals = text.chars().filter(|c| c.is_ascii_uppercase()).count();
    exclamations > 2 || capitals as f32 > text.chars().count() as f32 * 0.3
}

#[async_trait]
impl Classifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        let (positive_hits, negative_hits) = self.count_hits(text);
        let total = positive_hits + negative_hits;
        let ratio = if total == 0 {
            FALLBACK_SCORE
        } else {
            positive_hits as f32 / total as f32
        };

        let (label, mut score) = if ratio > POSITIVE_THRESHOLD {
            ("POSITIVE", ratio)
        } else if ratio < NEGATIVE_THRESHOLD {
            ("NEGATIVE", 1.0 - ratio)
        } else {
            ("NEUTRAL", FALLBACK_SCORE)
        };

        if label != "NEUTRAL" && is_emphatic(text) {
            score = (score + EMPHASIS_BOOST).min(1.0);
        }

        Ok(ClassificationResult {
            label: label.to_string(),
            score,
            metadata: ClassificationMetadata {
                model: Some(self.name.clone()),
                all_scores: Some(vec![
                    ("POSITIVE".to_string(), ratio),
                    ("NEGATIVE".to_string(), 1.0 - ratio),
                ]),
            },
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
