//! Request and response schema for the analysis endpoint

use serde::{Deserialize, Serialize};

/// Label returned when classification fails
pub const FALLBACK_LABEL: &str = "NEUTRAL";

/// Score returned when classification fails
pub const FALLBACK_SCORE: f32 = 0.5;

/// Body of `POST /analyze`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    /// Free text to classify. Empty strings are accepted.
    pub text: String,
}

/// Sentiment of a single feedback text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Classifier category, or `NEUTRAL` for the fallback
    pub label: String,

    /// Confidence score (0.0-1.0)
    pub score: f32,
}

impl AnalysisResult {
    /// Create a new analysis result
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    /// The fixed result returned in place of an error
    pub fn fallback() -> Self {
        Self::new(FALLBACK_LABEL, FALLBACK_SCORE)
    }

    /// Check whether this is the fallback sentinel
    pub fn is_fallback(&self) -> bool {
        self.label == FALLBACK_LABEL && self.score == FALLBACK_SCORE
    }
}
