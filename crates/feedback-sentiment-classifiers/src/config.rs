//! Classifier selection and construction

use crate::classifier::Classifier;
use crate::lexicon::LexiconClassifier;
use crate::model_loader::ModelConfig;
use feedback_sentiment_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which classifier implementation the service runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// DistilBERT SST-2 model loaded through Candle
    #[default]
    Distilbert,
    /// Word-list classifier, no model files needed
    Lexicon,
}

impl FromStr for ClassifierBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "distilbert" => Ok(Self::Distilbert),
            "lexicon" => Ok(Self::Lexicon),
            other => Err(format!(
                "unknown classifier backend '{other}' (expected 'distilbert' or 'lexicon')"
            )),
        }
    }
}

impl fmt::Display for ClassifierBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distilbert => write!(f, "distilbert"),
            Self::Lexicon => write!(f, "lexicon"),
        }
    }
}

/// Classifier section of the service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Implementation to build at startup
    pub backend: ClassifierBackend,

    /// Model settings, used by the `distilbert` backend
    pub model: ModelConfig,
}

impl ClassifierConfig {
    /// Build the configured classifier.
    ///
    /// Any failure here is a startup failure: there is no partially
    /// initialised or lazily loaded classifier.
    pub fn build(&self) -> Result<Arc<dyn Classifier>> {
        tracing::info!("Building '{}' classifier", self.backend);

        match self.backend {
            ClassifierBackend::Lexicon => Ok(Arc::new(LexiconClassifier::new()?)),
            ClassifierBackend::Distilbert => self.build_distilbert(),
        }
    }

    #[cfg(feature = "ml-models")]
    fn build_distilbert(&self) -> Result<Arc<dyn Classifier>> {
        let classifier = crate::distilbert::DistilBertSentimentClassifier::load(&self.model)?;
        Ok(Arc::new(classifier))
    }

    #[cfg(not(feature = "ml-models"))]
    fn build_distilbert(&self) -> Result<Arc<dyn Classifier>> {
        Err(Error::config(
            "the 'distilbert' backend requires the 'ml-models' feature",
        ))
    }
}

/// Parse a backend name, for CLI value parsers
pub fn parse_backend(s: &str) -> std::result::Result<ClassifierBackend, Error> {
    s.parse().map_err(Error::config)
}
