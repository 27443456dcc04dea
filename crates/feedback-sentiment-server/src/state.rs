use anyhow::Context;
use feedback_sentiment_classifiers::{Classifier, ClassifierConfig};
use std::sync::Arc;
use tracing::info;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Classifier built once at startup, read-only afterwards
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Build the configured classifier before the server accepts connections.
    ///
    /// Model loading can download weights, so it runs on the blocking pool.
    pub async fn from_config(config: &ClassifierConfig) -> anyhow::Result<Self> {
        let config = config.clone();
        let classifier = tokio::task::spawn_blocking(move || config.build())
            .await
            .context("Classifier initialisation task failed")?
            .context("Failed to initialise classifier")?;

        info!("Classifier '{}' ready", classifier.name());
        Ok(Self::new(classifier))
    }
}
