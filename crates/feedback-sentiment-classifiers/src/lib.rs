//! Feedback Sentiment Classifiers
//!
//! Sentiment classifiers behind a common async [`Classifier`] trait:
//! - [`DistilBertSentimentClassifier`]: the pinned DistilBERT SST-2 model,
//!   run on CPU with Candle (feature `ml-models`, on by default)
//! - [`LexiconClassifier`]: positive/negative word lists for offline use
//!
//! A classifier is built once from [`ClassifierConfig`] and then shared
//! read-only by every request.

pub mod classifier;
pub mod config;
#[cfg(feature = "ml-models")]
pub mod distilbert;
pub mod lexicon;
pub mod model_loader;

pub use classifier::{ClassificationMetadata, ClassificationResult, Classifier};
pub use config::{parse_backend, ClassifierBackend, ClassifierConfig};
#[cfg(feature = "ml-models")]
pub use distilbert::DistilBertSentimentClassifier;
pub use lexicon::LexiconClassifier;
pub use model_loader::{
    DeviceType, ModelConfig, ModelFiles, ModelSource, DEFAULT_MODEL_REPO, DEFAULT_MODEL_REVISION,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::config::{ClassifierBackend, ClassifierConfig};
    pub use crate::lexicon::LexiconClassifier;
    pub use crate::model_loader::{DeviceType, ModelConfig, ModelSource};
}
