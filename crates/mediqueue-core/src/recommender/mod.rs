//! Specialty recommender.
//!
//! Pipeline: Preprocessing → Classifier (optional) → Confidence gate → Keyword fallback
//!
//! The recommender never fails. Model unavailability, inference errors and
//! low-confidence predictions all fall through to the keyword table, which
//! always yields one of the known specialties.

mod classifier;
mod keywords;
#[cfg(feature = "onnx")]
mod onnx;
mod preprocess;

pub use classifier::*;
pub use keywords::*;
#[cfg(feature = "onnx")]
pub use onnx::*;
pub use preprocess::*;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{RecommendationResult, ScoredLabel};

/// Phrases that trigger the medical-emergency banner.
pub const CRITICAL_SYMPTOMS: [&str; 5] = [
    "chest pain",
    "shortness of breath",
    "severe pain",
    "unconscious",
    "heart attack",
];

/// Recommender errors. All are absorbed by [`Recommender::recommend`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommenderError {
    /// The model could not be loaded; permanent for this process
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// A single inference call failed
    #[error("Inference failed: {0}")]
    InferenceFailure(String),

    /// The top prediction is below the confidence threshold
    #[error("Low confidence prediction: {}", describe_ranking(.ranked))]
    LowConfidence { ranked: Vec<ScoredLabel> },
}

fn describe_ranking(ranked: &[ScoredLabel]) -> String {
    ranked
        .iter()
        .map(|s| format!("{} ({:.3})", s.label, s.confidence))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type RecommenderResult<T> = Result<T, RecommenderError>;

/// Symptom → specialty recommender.
pub struct Recommender {
    matcher: KeywordMatcher,
    adapter: Option<ClassifierAdapter>,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::keyword_only()
    }
}

impl Recommender {
    /// Recommender backed only by the keyword table.
    pub fn keyword_only() -> Self {
        Self {
            matcher: KeywordMatcher::new(),
            adapter: None,
        }
    }

    /// Recommender that consults `classifier` before the keyword table.
    pub fn with_classifier(classifier: LazyClassifier) -> Self {
        Self {
            matcher: KeywordMatcher::new(),
            adapter: Some(ClassifierAdapter::new(classifier)),
        }
    }

    /// Recommender that loads the ONNX model from `model_dir` on first use.
    ///
    /// Without the `onnx` feature the load always fails and the keyword
    /// table answers every query.
    pub fn with_model_dir(model_dir: impl Into<PathBuf>) -> Self {
        Self::with_classifier(LazyClassifier::new(model_dir_loader(model_dir.into())))
    }

    /// Replace the keyword matcher.
    pub fn with_matcher(mut self, matcher: KeywordMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Recommend a specialty for free-text symptoms. Never fails.
    pub fn recommend(&self, symptoms: &str) -> RecommendationResult {
        match self.try_model(symptoms) {
            Ok(result) => {
                info!(
                    label = %result.label,
                    confidence = ?result.confidence,
                    emergency = result.emergency,
                    "Model recommendation accepted"
                );
                result
            }
            Err(RecommenderError::ModelUnavailable(reason)) => {
                debug!(%reason, "No model; using keyword table");
                self.fallback(symptoms)
            }
            Err(e) => {
                warn!(error = %e, "Model recommendation rejected; using keyword table");
                self.fallback(symptoms)
            }
        }
    }

    /// Model path only, with the confidence policy applied.
    pub fn try_model(&self, symptoms: &str) -> RecommenderResult<RecommendationResult> {
        match &self.adapter {
            Some(adapter) => adapter.classify(symptoms),
            None => Err(RecommenderError::ModelUnavailable(
                "no classifier configured".into(),
            )),
        }
    }

    /// Keyword-table path only.
    pub fn fallback(&self, symptoms: &str) -> RecommendationResult {
        let decision = self.matcher.explain(symptoms);
        debug!(?decision, "Keyword match");
        RecommendationResult::fallback(decision.specialty())
    }

    pub fn matcher(&self) -> &KeywordMatcher {
        &self.matcher
    }

    /// Whether a classifier is configured (loaded or not).
    pub fn has_classifier(&self) -> bool {
        self.adapter.is_some()
    }
}

/// Whether the symptoms mention a critical warning sign.
pub fn critical_symptom_warning(symptoms: &str) -> bool {
    let lower = symptoms.to_lowercase();
    CRITICAL_SYMPTOMS.iter().any(|phrase| lower.contains(phrase))
}

#[cfg(feature = "onnx")]
fn model_dir_loader(model_dir: PathBuf) -> ClassifierLoader {
    Box::new(move || {
        let classifier = OnnxClassifier::load(&model_dir)?;
        Ok(Arc::new(classifier) as Arc<dyn SpecialtyClassifier>)
    })
}

#[cfg(not(feature = "onnx"))]
fn model_dir_loader(model_dir: PathBuf) -> ClassifierLoader {
    Box::new(move || -> Result<Arc<dyn SpecialtyClassifier>, ClassifierError> {
        Err(ClassifierError::ModelInit(format!(
            "built without the `onnx` feature; cannot load {}",
            model_dir.display()
        )))
    })
}
