//! ONNX Runtime backend for the specialty classifier.
//!
//! Expects an exported sequence-classification model directory:
//! - `model.onnx`: weights, inputs `input_ids` and `attention_mask`, output logits `[1, n_labels]`
//! - `tokenizer.json`: HuggingFace tokenizer definition
//! - `config.json`: HuggingFace model config with the `id2label` map

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::TensorRef;
use tokenizers::{Tokenizer, TruncationParams};

use super::classifier::{
    labels_from_config, rank_logits, ClassifierError, SpecialtyClassifier, MAX_SEQUENCE_TOKENS,
};
use crate::models::{ScoredLabel, Specialty};

/// Fine-tuned text classifier running on ONNX Runtime.
///
/// The session sits behind a Mutex because `Session::run` takes `&mut self`.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: Vec<Specialty>,
}

impl OnnxClassifier {
    /// Load the model, tokenizer and label map from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self, ClassifierError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let config_path = model_dir.join("config.json");

        for path in [&model_path, &tokenizer_path, &config_path] {
            if !path.exists() {
                return Err(ClassifierError::ModelNotFound(path.clone()));
            }
        }

        let config = std::fs::read_to_string(&config_path)
            .map_err(|e| ClassifierError::ModelInit(format!("Config read failed: {e}")))?;
        let labels = labels_from_config(&config)?;

        let session = Session::builder()
            .map_err(|e: ort::Error| ClassifierError::ModelInit(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e: ort::Error| ClassifierError::ModelInit(e.to_string()))?
            .commit_from_file(&model_path)
            .map_err(|e: ort::Error| ClassifierError::ModelInit(format!("ONNX load failed: {e}")))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| ClassifierError::ModelInit(format!("Tokenizer load failed: {e}")))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| ClassifierError::ModelInit(format!("Tokenizer truncation: {e}")))?;

        tracing::info!(
            labels = labels.len(),
            "ONNX classifier loaded from {}",
            model_dir.display()
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            labels,
        })
    }

    /// Labels in model output order.
    pub fn labels(&self) -> &[Specialty] {
        &self.labels
    }

    fn logits(&self, text: &str) -> Result<Vec<f32>, ClassifierError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ClassifierError::Tokenization(e.to_string()))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let seq_len = input_ids.len();

        let ids_array = ndarray::Array2::from_shape_vec((1, seq_len), input_ids)
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;
        let mask_array = ndarray::Array2::from_shape_vec((1, seq_len), attention_mask)
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let ids_tensor = TensorRef::from_array_view(&ids_array)
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;
        let mask_tensor = TensorRef::from_array_view(&mask_array)
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Inference("Session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![ids_tensor, mask_tensor])
            .map_err(|e| ClassifierError::Inference(format!("ONNX inference failed: {e}")))?;

        let (shape, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("Output extraction: {e}")))?;

        if shape.len() != 2 || shape[1] as usize != self.labels.len() {
            return Err(ClassifierError::Inference(format!(
                "Unexpected output shape: {shape:?}, expected [1, {}]",
                self.labels.len()
            )));
        }

        Ok(logits[..self.labels.len()].to_vec())
    }
}

impl SpecialtyClassifier for OnnxClassifier {
    fn predict(&self, text: &str, top_k: usize) -> Result<Vec<ScoredLabel>, ClassifierError> {
        let logits = self.logits(text)?;
        rank_logits(&logits, &self.labels, top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_dir() {
        let dir = tempfile::tempdir().unwrap();
        match OnnxClassifier::load(dir.path()) {
            Err(ClassifierError::ModelNotFound(path)) => {
                assert!(path.ends_with("model.onnx"));
            }
            Err(other) => panic!("expected ModelNotFound, got {other:?}"),
            Ok(_) => panic!("load should fail on an empty directory"),
        }
    }
}
