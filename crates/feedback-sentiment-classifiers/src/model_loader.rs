//! Model source configuration and file resolution for Candle classifiers

use feedback_sentiment_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Hugging Face repository of the default sentiment model
pub const DEFAULT_MODEL_REPO: &str = "distilbert/distilbert-base-uncased-finetuned-sst-2-english";

/// Pinned revision of [`DEFAULT_MODEL_REPO`]
pub const DEFAULT_MODEL_REVISION: &str = "714eb0f";

/// Configuration for loading a sequence-classification model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Source of the model
    pub source: ModelSource,

    /// Device to run inference on
    pub device: DeviceType,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            source: ModelSource::HuggingFace {
                repo: DEFAULT_MODEL_REPO.to_string(),
                revision: DEFAULT_MODEL_REVISION.to_string(),
            },
            device: DeviceType::Cpu,
        }
    }
}

impl ModelConfig {
    /// Create a new model configuration from a local directory
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ModelSource::Local { path: path.into() },
            ..Default::default()
        }
    }

    /// Create a new model configuration from Hugging Face
    pub fn from_hf(repo: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            source: ModelSource::HuggingFace {
                repo: repo.into(),
                revision: revision.into(),
            },
            ..Default::default()
        }
    }

    /// Set device
    pub fn with_device(mut self, device: DeviceType) -> Self {
        self.device = device;
        self
    }

    /// Human-readable identifier used in logs and result metadata
    pub fn display_name(&self) -> String {
        match &self.source {
            ModelSource::Local { path } => path.display().to_string(),
            ModelSource::HuggingFace { repo, revision } => format!("{repo}@{revision}"),
        }
    }
}

/// Source location for model files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSource {
    /// Directory holding `config.json`, weights and tokenizer files
    Local { path: PathBuf },

    /// Download from Hugging Face Hub (cached on disk after the first run)
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },
}

fn default_revision() -> String {
    DEFAULT_MODEL_REVISION.to_string()
}

/// Device type for inference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// CPU inference (always available)
    #[default]
    Cpu,
    /// First CUDA GPU, requires a CUDA-enabled Candle build
    Cuda,
    /// Apple Silicon GPU, requires a Metal-enabled Candle build
    Metal,
}

/// Weight file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightsFormat {
    /// SafeTensors format (preferred)
    SafeTensors,
    /// PyTorch pickle format
    PyTorch,
}

/// Tokenizer definition found next to the weights
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizerFile {
    /// Serialized `tokenizers` pipeline
    Json(PathBuf),
    /// Plain WordPiece vocabulary
    Vocab(PathBuf),
}

/// Resolved on-disk locations of everything needed to build a classifier
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub weights: PathBuf,
    pub format: WeightsFormat,
    pub tokenizer: TokenizerFile,
}

const WEIGHT_FILES: [(&str, WeightsFormat); 2] = [
    ("model.safetensors", WeightsFormat::SafeTensors),
    ("pytorch_model.bin", WeightsFormat::PyTorch),
];

impl ModelFiles {
    /// Resolve model files, downloading them from the Hub when needed
    pub fn resolve(source: &ModelSource) -> Result<Self> {
        match source {
            ModelSource::Local { path } => Self::from_dir(path),
            ModelSource::HuggingFace { repo, revision } => Self::from_hub(repo, revision),
        }
    }

    /// Resolve model files inside a local directory
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::model_load(format!(
                "Model directory does not exist: {}",
                dir.display()
            )));
        }

        let config = dir.join("config.json");
        if !config.exists() {
            return Err(Error::model_load(format!(
                "config.json not found in {}",
                dir.display()
            )));
        }

        let (weights, format) = WEIGHT_FILES
            .iter()
            .map(|(name, format)| (dir.join(name), *format))
            .find(|(path, _)| path.exists())
            .ok_or_else(|| {
                Error::model_load(format!(
                    "No model weights found in {} (tried model.safetensors, pytorch_model.bin)",
                    dir.display()
                ))
            })?;

        let tokenizer = if dir.join("tokenizer.json").exists() {
            TokenizerFile::Json(dir.join("tokenizer.json"))
        } else if dir.join("vocab.txt").exists() {
            TokenizerFile::Vocab(dir.join("vocab.txt"))
        } else {
            return Err(Error::model_load(format!(
                "No tokenizer found in {} (tried tokenizer.json, vocab.txt)",
                dir.display()
            )));
        };

        Ok(Self {
            config,
            weights,
            format,
            tokenizer,
        })
    }

    #[cfg(feature = "ml-models")]
    fn from_hub(repo: &str, revision: &str) -> Result<Self> {
        use hf_hub::{api::sync::Api, Repo, RepoType};

        tracing::info!("Resolving model from HuggingFace: {} @ {}", repo, revision);

        let api = Api::new()
            .map_err(|e| Error::model_load(format!("Failed to initialize HuggingFace API: {e}")))?;
        let repo_obj = api.repo(Repo::with_revision(
            repo.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));

        let config = repo_obj
            .get("config.json")
            .map_err(|e| Error::model_load(format!("Failed to download config.json: {e}")))?;

        let mut weights = None;
        for (name, format) in WEIGHT_FILES {
            match repo_obj.get(name) {
                Ok(path) => {
                    tracing::debug!("Found weight file: {}", name);
                    weights = Some((path, format));
                    break;
                }
                Err(e) => tracing::debug!("Weight file {} unavailable: {}", name, e),
            }
        }
        let (weights, format) = weights.ok_or_else(|| {
            Error::model_load(format!(
                "No model weights found for {repo}@{revision} (tried model.safetensors, pytorch_model.bin)"
            ))
        })?;

        let tokenizer = match repo_obj.get("tokenizer.json") {
            Ok(path) => TokenizerFile::Json(path),
            Err(_) => repo_obj.get("vocab.txt").map(TokenizerFile::Vocab).map_err(|e| {
                Error::model_load(format!(
                    "No tokenizer found for {repo}@{revision} (tried tokenizer.json, vocab.txt): {e}"
                ))
            })?,
        };

        tracing::info!("Model files available at: {}", config.display());

        Ok(Self {
            config,
            weights,
            format,
            tokenizer,
        })
    }

    #[cfg(not(feature = "ml-models"))]
    fn from_hub(repo: &str, revision: &str) -> Result<Self> {
        Err(Error::model_load(format!(
            "Downloading {repo}@{revision} requires the 'ml-models' feature"
        )))
    }
}
