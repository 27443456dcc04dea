//! Classifier trait and common types

use async_trait::async_trait;
use feedback_sentiment_core::{AnalysisResult, Error, Result};
use std::time::Instant;

/// Trait for all sentiment classifiers
///
/// Implementations are built once at startup and shared read-only across
/// requests, so they must not rely on interior mutation for correctness.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the given text
    async fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Result of classification
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Top-ranked label
    pub label: String,

    /// Confidence of the top-ranked label (0.0-1.0)
    pub score: f32,

    /// Additional metadata
    pub metadata: ClassificationMetadata,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
            metadata: ClassificationMetadata::default(),
            latency_us: 0,
        }
    }

    /// Build a result from unordered `(label, probability)` pairs.
    ///
    /// The pairs are ranked by descending score and the first one becomes
    /// the result's label and score.
    pub fn ranked(
        model: &str,
        scores: impl IntoIterator<Item = (String, f32)>,
        start: Instant,
    ) -> Result<Self> {
        let mut all_scores: Vec<(String, f32)> = scores.into_iter().collect();
        all_scores.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        let (label, score) = all_scores
            .first()
            .cloned()
            .ok_or_else(|| Error::classifier("model produced no scores"))?;

        if !score.is_finite() {
            return Err(Error::classifier(format!(
                "model produced a non-finite score for '{label}'"
            )));
        }

        Ok(Self {
            label,
            score,
            metadata: ClassificationMetadata {
                model: Some(model.to_string()),
                all_scores: Some(all_scores),
            },
            latency_us: start.elapsed().as_micros() as u64,
        })
    }
}

impl From<ClassificationResult> for AnalysisResult {
    fn from(result: ClassificationResult) -> Self {
        AnalysisResult::new(result.label, result.score)
    }
}

/// Metadata about classification
#[derive(Debug, Clone, Default)]
pub struct ClassificationMetadata {
    /// Model name or version
    pub model: Option<String>,

    /// All class scores, highest first
    pub all_scores: Option<Vec<(String, f32)>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_picks_highest() {
        let result = ClassificationResult::ranked(
            "test",
            vec![("NEGATIVE".to_string(), 0.1), ("POSITIVE".to_string(), 0.9)],
            Instant::now(),
        )
        .unwrap();

        assert_eq!(result.label, "POSITIVE");
        assert_eq!(result.score, 0.9);

        let all = result.metadata.all_scores.unwrap();
        assert_eq!(all[0].0, "POSITIVE");
        assert_eq!(all[1].0, "NEGATIVE");
        assert_eq!(result.metadata.model.as_deref(), Some("test"));
    }

    #[test]
    fn test_ranked_rejects_empty() {
        let err = ClassificationResult::ranked("test", Vec::new(), Instant::now()).unwrap_err();
        assert!(matches!(err, Error::Classifier(_)));
    }

    #[test]
    fn test_ranked_rejects_nan() {
        let result = ClassificationResult::ranked(
            "test",
            vec![("POSITIVE".to_string(), f32::NAN)],
            Instant::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_into_analysis_result() {
        let analysis: AnalysisResult = ClassificationResult::new("NEGATIVE", 0.97).into();
        assert_eq!(analysis, AnalysisResult::new("NEGATIVE", 0.97));
    }
}
