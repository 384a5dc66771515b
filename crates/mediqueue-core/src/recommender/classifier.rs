//! Classifier seam, lazy model resource and confidence policy.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use serde::Deserialize;
use thiserror::Error;

use super::preprocess::clean_medical_text;
use super::{RecommenderError, RecommenderResult};
use crate::models::{RecommendationResult, ScoredLabel, Specialty};

/// Number of ranked predictions requested from the model.
pub const TOP_K: usize = 3;

/// Minimum top-1 probability for the model's answer to be used.
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Inputs longer than this are truncated by the tokenizer.
pub const MAX_SEQUENCE_TOKENS: usize = 256;

/// Classifier errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("Model artifact not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Model initialization failed: {0}")]
    ModelInit(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model label is not a known specialty: {0}")]
    UnknownLabel(String),
}

/// A text classifier over the closed specialty set.
///
/// `text` has already been through [`clean_medical_text`]. Implementations
/// return at most `top_k` labels sorted by descending confidence.
pub trait SpecialtyClassifier: Send + Sync {
    fn predict(&self, text: &str, top_k: usize) -> Result<Vec<ScoredLabel>, ClassifierError>;
}

/// Softmax the logits and keep the `top_k` most probable labels.
///
/// `labels[i]` is the specialty for `logits[i]`.
pub fn rank_logits(
    logits: &[f32],
    labels: &[Specialty],
    top_k: usize,
) -> Result<Vec<ScoredLabel>, ClassifierError> {
    if logits.len() != labels.len() {
        return Err(ClassifierError::Inference(format!(
            "Model produced {} logits for {} labels",
            logits.len(),
            labels.len()
        )));
    }

    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f64> = logits.iter().map(|&l| f64::from(l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();

    let mut ranked: Vec<ScoredLabel> = labels
        .iter()
        .zip(exps)
        .map(|(label, e)| ScoredLabel::new(*label, e / sum))
        .collect();

    // Stable sort keeps label order among equal probabilities.
    ranked.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(top_k);
    Ok(ranked)
}

#[derive(Deserialize)]
struct LabelConfig {
    id2label: BTreeMap<String, String>,
}

/// Read the label order from a HuggingFace `config.json` (`id2label` map).
///
/// Every label must be a known specialty and ids must be 0..n.
pub fn labels_from_config(json: &str) -> Result<Vec<Specialty>, ClassifierError> {
    let config: LabelConfig = serde_json::from_str(json)
        .map_err(|e| ClassifierError::ModelInit(format!("Invalid model config: {}", e)))?;

    let mut indexed = Vec::with_capacity(config.id2label.len());
    for (id, name) in config.id2label {
        let id: usize = id
            .parse()
            .map_err(|_| ClassifierError::ModelInit(format!("Invalid label id: {}", id)))?;
        let specialty: Specialty = name
            .parse()
            .map_err(|_| ClassifierError::UnknownLabel(name.clone()))?;
        indexed.push((id, specialty));
    }
    indexed.sort_by_key(|(id, _)| *id);

    if indexed.iter().enumerate().any(|(pos, (id, _))| pos != *id) {
        return Err(ClassifierError::ModelInit(
            "Label ids are not contiguous from 0".into(),
        ));
    }
    if indexed.is_empty() {
        return Err(ClassifierError::ModelInit("Model config has no labels".into()));
    }

    Ok(indexed.into_iter().map(|(_, s)| s).collect())
}

/// Builds the classifier on first use.
pub type ClassifierLoader =
    Box<dyn Fn() -> Result<Arc<dyn SpecialtyClassifier>, ClassifierError> + Send + Sync>;

/// Process-wide, load-once model resource.
///
/// The loader runs at most once. A failed load is remembered and every later
/// call reports it without retrying.
pub struct LazyClassifier {
    loader: ClassifierLoader,
    model: OnceLock<Result<Arc<dyn SpecialtyClassifier>, ClassifierError>>,
}

impl LazyClassifier {
    /// Defer loading to the first request.
    pub fn new(loader: ClassifierLoader) -> Self {
        Self {
            loader,
            model: OnceLock::new(),
        }
    }

    /// Wrap an already-constructed classifier.
    pub fn ready(classifier: Arc<dyn SpecialtyClassifier>) -> Self {
        let lazy = Self::new(Box::new(|| {
            Err(ClassifierError::ModelInit("loader not used".into()))
        }));
        let _ = lazy.model.set(Ok(classifier));
        lazy
    }

    /// Get the model, loading it if this is the first call.
    pub fn get(&self) -> RecommenderResult<&Arc<dyn SpecialtyClassifier>> {
        self.model
            .get_or_init(|| {
                let loaded = catch_unwind(AssertUnwindSafe(|| (self.loader)())).unwrap_or_else(
                    |_| Err(ClassifierError::ModelInit("model loader panicked".into())),
                );
                match &loaded {
                    Ok(_) => tracing::info!("Specialty classifier loaded"),
                    Err(e) => tracing::warn!(
                        error = %e,
                        "Specialty classifier unavailable; keyword fallback will be used"
                    ),
                }
                loaded
            })
            .as_ref()
            .map_err(|e| RecommenderError::ModelUnavailable(e.to_string()))
    }

    /// Whether a load has been attempted.
    pub fn is_initialized(&self) -> bool {
        self.model.get().is_some()
    }
}

/// Applies preprocessing and the confidence policy around a classifier.
pub struct ClassifierAdapter {
    classifier: LazyClassifier,
}

impl ClassifierAdapter {
    pub fn new(classifier: LazyClassifier) -> Self {
        Self { classifier }
    }

    /// Classify symptoms, accepting the top label only at or above
    /// [`CONFIDENCE_THRESHOLD`].
    pub fn classify(&self, symptoms: &str) -> RecommenderResult<RecommendationResult> {
        let model = self.classifier.get()?;
        let text = clean_medical_text(symptoms);

        let ranked = catch_unwind(AssertUnwindSafe(|| model.predict(&text, TOP_K)))
            .map_err(|_| RecommenderError::InferenceFailure("classifier panicked".into()))?
            .map_err(|e| RecommenderError::InferenceFailure(e.to_string()))?;

        let top = *ranked
            .first()
            .ok_or_else(|| RecommenderError::InferenceFailure("empty prediction list".into()))?;

        if !(top.confidence >= CONFIDENCE_THRESHOLD) {
            return Err(RecommenderError::LowConfidence { ranked });
        }

        let alternatives = ranked.into_iter().skip(1).collect();
        Ok(RecommendationResult::from_model(top, alternatives))
    }

    pub fn classifier(&self) -> &LazyClassifier {
        &self.classifier
    }
}

/// Classifier with a fixed answer, for tests and host-side demos.
pub struct MockClassifier {
    outcome: Result<Vec<ScoredLabel>, ClassifierError>,
    calls: AtomicUsize,
    last_input: Mutex<Option<String>>,
}

impl MockClassifier {
    /// Always return this ranking (truncated to `top_k`).
    pub fn ranking(ranked: Vec<ScoredLabel>) -> Self {
        Self {
            outcome: Ok(ranked),
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    /// Always fail inference with this error.
    pub fn failing(error: ClassifierError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    /// Number of predictions served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Text received by the most recent prediction.
    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SpecialtyClassifier for MockClassifier {
    fn predict(&self, text: &str, top_k: usize) -> Result<Vec<ScoredLabel>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_input.lock() {
            *guard = Some(text.to_string());
        }
        self.outcome
            .clone()
            .map(|ranked| ranked.into_iter().take(top_k).collect())
    }
}
