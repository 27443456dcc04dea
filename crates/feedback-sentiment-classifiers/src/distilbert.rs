//! DistilBERT sequence classifier on Candle
//!
//! Loads a `DistilBertForSequenceClassification` checkpoint (backbone,
//! `pre_classifier`, `classifier`) and scores one text per call. Labels come
//! from `id2label` in the checkpoint's `config.json`.

use crate::classifier::{ClassificationResult, Classifier};
use crate::model_loader::{DeviceType, ModelConfig, ModelFiles, TokenizerFile, WeightsFormat};
use async_trait::async_trait;
use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use feedback_sentiment_core::{Error, Result};
use std::path::Path;
use std::time::Instant;
use tokenizers::Tokenizer;

const DEFAULT_LABELS: [&str; 2] = ["NEGATIVE", "POSITIVE"];
const DEFAULT_HIDDEN_SIZE: usize = 768;
const DEFAULT_MAX_POSITIONS: usize = 512;

/// DistilBERT binary/multi-class sentiment classifier
pub struct DistilBertSentimentClassifier {
    name: String,
    tokenizer: Tokenizer,
    model: DistilBertModel,
    pre_classifier: Linear,
    classifier: Linear,
    device: Device,
    labels: Vec<String>,
    max_positions: usize,
}

impl DistilBertSentimentClassifier {
    /// Resolve the model files and load weights, head and tokenizer.
    ///
    /// Blocks on network and disk I/O the first time a Hub revision is used.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let name = config.display_name();
        tracing::info!("Loading DistilBERT sentiment model '{}'", name);

        let files = ModelFiles::resolve(&config.source)?;
        let device = create_device(config.device)?;
        Self::from_files(name, &files, device)
    }

    /// Build the classifier from already-resolved files
    pub fn from_files(name: impl Into<String>, files: &ModelFiles, device: Device) -> Result<Self> {
        let config_str = std::fs::read_to_string(&files.config).map_err(|e| {
            Error::model_load(format!(
                "Failed to read config {}: {}",
                files.config.display(),
                e
            ))
        })?;
        let config_json: serde_json::Value = serde_json::from_str(&config_str)
            .map_err(|e| Error::model_load(format!("Failed to parse config JSON: {e}")))?;
        let distilbert_config: DistilBertConfig = serde_json::from_str(&config_str)
            .map_err(|e| Error::model_load(format!("Failed to parse DistilBERT config: {e}")))?;

        let hidden_size = hidden_size_from_config(&config_json);
        let max_positions = config_json
            .get("max_position_embeddings")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_MAX_POSITIONS);
        let labels = labels_from_config(&config_json);

        let vb = load_var_builder(&files.weights, files.format, &device)?;
        let model = load_backbone(&vb, &distilbert_config)?;

        let pre_classifier = candle_nn::linear(hidden_size, hidden_size, vb.pp("pre_classifier"))
            .map_err(|e| Error::model_load(format!("Failed to load pre_classifier: {e}")))?;
        let classifier = candle_nn::linear(hidden_size, labels.len(), vb.pp("classifier"))
            .map_err(|e| Error::model_load(format!("Failed to load classification head: {e}")))?;

        let tokenizer = load_tokenizer(&files.tokenizer)?;

        tracing::info!(
            "Successfully loaded DistilBERT classifier (hidden_size={}, labels={:?})",
            hidden_size,
            labels
        );

        Ok(Self {
            name: name.into(),
            tokenizer,
            model,
            pre_classifier,
            classifier,
            device,
            labels,
            max_positions,
        })
    }

    /// Labels in logit order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn probabilities(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::classifier(format!("Tokenization failed: {e}")))?;

        let seq_len = encoding.get_ids().len();
        if seq_len > self.max_positions {
            return Err(Error::classifier(format!(
                "input of {} tokens exceeds the model limit of {}",
                seq_len, self.max_positions
            )));
        }

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(inference_error("Failed to create input tensor"))?;

        // Candle's DistilBERT masks positions where the mask is non-zero.
        let padding_mask: Vec<u8> = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| u8::from(x == 0))
            .collect();
        let attention_mask = Tensor::new(padding_mask.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(inference_error("Failed to create attention mask"))?;

        let hidden_states = self
            .model
            .forward(&input_ids, &attention_mask)
            .map_err(inference_error("Model forward pass failed"))?;

        let cls_embedding = hidden_states
            .i((.., 0))
            .map_err(inference_error("Failed to get CLS token"))?;

        let pooled = self
            .pre_classifier
            .forward(&cls_embedding)
            .and_then(|t| t.relu())
            .map_err(inference_error("Pre-classifier failed"))?;

        let logits = self
            .classifier
            .forward(&pooled)
            .map_err(inference_error("Classification head failed"))?;

        candle_nn::ops::softmax(&logits, D::Minus1)
            .and_then(|t| t.squeeze(0))
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(inference_error("Softmax failed"))
    }
}

#[async_trait]
impl Classifier for DistilBertSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();
        let probs = self.probabilities(text)?;

        ClassificationResult::ranked(
            &self.name,
            self.labels.iter().cloned().zip(probs),
            start,
        )
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn inference_error(context: &'static str) -> impl FnOnce(candle_core::Error) -> Error {
    move |e| Error::classifier(format!("{context}: {e}"))
}

/// Create Candle device from device type
pub fn create_device(device: DeviceType) -> Result<Device> {
    match device {
        DeviceType::Cpu => Ok(Device::Cpu),
        DeviceType::Cuda => Device::new_cuda(0)
            .map_err(|e| Error::config(format!("Failed to create CUDA device: {e}"))),
        DeviceType::Metal => Device::new_metal(0)
            .map_err(|e| Error::config(format!("Failed to create Metal device: {e}"))),
    }
}

fn load_var_builder(
    weights: &Path,
    format: WeightsFormat,
    device: &Device,
) -> Result<VarBuilder<'static>> {
    match format {
        WeightsFormat::SafeTensors => {
            // SAFETY: the weights file is not modified while mapped.
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, device) }
                .map_err(|e| Error::model_load(format!("Failed to load SafeTensors: {e}")))
        }
        WeightsFormat::PyTorch => VarBuilder::from_pth(weights, DType::F32, device)
            .map_err(|e| Error::model_load(format!("Failed to load PyTorch weights: {e}"))),
    }
}

fn load_backbone(vb: &VarBuilder, config: &DistilBertConfig) -> Result<DistilBertModel> {
    let mut errors = Vec::new();

    for prefix in ["distilbert", ""] {
        let vb_prefix = if prefix.is_empty() {
            vb.clone()
        } else {
            vb.pp(prefix)
        };
        let effective_prefix = if prefix.is_empty() { "<root>" } else { prefix };

        match DistilBertModel::load(vb_prefix, config) {
            Ok(model) => {
                tracing::debug!("Loaded DistilBERT backbone from '{}'", effective_prefix);
                return Ok(model);
            }
            Err(e) => errors.push(format!("{effective_prefix}: {e}")),
        }
    }

    Err(Error::model_load(format!(
        "Failed to load DistilBERT backbone with tried prefixes [{}]",
        errors.join(" | ")
    )))
}

fn load_tokenizer(file: &TokenizerFile) -> Result<Tokenizer> {
    let mut tokenizer = match file {
        TokenizerFile::Json(path) => {
            tracing::debug!("Loading tokenizer from {}", path.display());
            Tokenizer::from_file(path)
                .map_err(|e| Error::model_load(format!("Failed to load tokenizer.json: {e}")))?
        }
        TokenizerFile::Vocab(path) => {
            tracing::debug!("Building WordPiece tokenizer from {}", path.display());
            wordpiece_tokenizer(path)?
        }
    };

    // Over-long inputs must reach the length check, not be cut silently.
    tokenizer.with_padding(None);
    tokenizer
        .with_truncation(None)
        .map_err(|e| Error::model_load(format!("Failed to disable truncation: {e}")))?;

    Ok(tokenizer)
}

fn wordpiece_tokenizer(vocab_path: &Path) -> Result<Tokenizer> {
    use tokenizers::models::wordpiece::WordPiece;
    use tokenizers::normalizers::BertNormalizer;
    use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
    use tokenizers::processors::bert::BertProcessing;

    let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
        .unk_token("[UNK]".to_string())
        .build()
        .map_err(|e| Error::model_load(format!("Failed to build WordPiece model: {e}")))?;

    let mut tokenizer = Tokenizer::new(wordpiece);
    let special_id = |token: &str| {
        tokenizer
            .token_to_id(token)
            .ok_or_else(|| Error::model_load(format!("vocab.txt has no {token} token")))
    };
    let sep = ("[SEP]".to_string(), special_id("[SEP]")?);
    let cls = ("[CLS]".to_string(), special_id("[CLS]")?);

    tokenizer.with_normalizer(Some(BertNormalizer::default()));
    tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
    tokenizer.with_post_processor(Some(BertProcessing::new(sep, cls)));

    Ok(tokenizer)
}

fn hidden_size_from_config(config: &serde_json::Value) -> usize {
    config
        .get("dim")
        .or_else(|| config.get("hidden_size"))
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .unwrap_or(DEFAULT_HIDDEN_SIZE)
}

/// Read `id2label` from a Hugging Face model config, ordered by class index
pub fn labels_from_config(config: &serde_json::Value) -> Vec<String> {
    let mut labels: Vec<(usize, String)> = config
        .get("id2label")
        .and_then(|v| v.as_object())
        .map(|map| {
            map.iter()
                .filter_map(|(idx, label)| Some((idx.parse().ok()?, label.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default();

    if labels.is_empty() {
        return DEFAULT_LABELS.iter().map(|l| l.to_string()).collect();
    }

    labels.sort_by_key(|(idx, _)| *idx);
    labels.into_iter().map(|(_, label)| label).collect()
}
