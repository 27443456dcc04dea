//! Error types for the feedback sentiment service

/// Result type alias using the service's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type shared by the classifier and server crates
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Inference failed for a single input
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Model weights, tokenizer, or model config could not be loaded
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new model load error
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::classifier("empty logits").to_string(),
            "classifier error: empty logits"
        );
        assert_eq!(
            Error::model_load("no weights").to_string(),
            "model load error: no weights"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
