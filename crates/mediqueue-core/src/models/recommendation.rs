//! Specialty recommendation models.

use serde::{Deserialize, Serialize};

use super::specialty::{Specialty, EMERGENCY_MARKER};

/// Which path produced a recommendation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecommendationSource {
    /// Deterministic keyword table
    Fallback,
    /// Fine-tuned text classifier
    Model,
}

/// A specialty with the classifier's confidence for it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoredLabel {
    pub label: Specialty,
    /// Softmax probability (0.0 - 1.0)
    pub confidence: f64,
}

impl ScoredLabel {
    pub fn new(label: Specialty, confidence: f64) -> Self {
        Self { label, confidence }
    }
}

/// Final answer handed to the caller. Always carries a valid label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    /// Recommended specialty
    pub label: Specialty,
    /// Model confidence; absent for keyword fallback
    pub confidence: Option<f64>,
    /// Whether the label is in the emergency subset
    pub emergency: bool,
    /// Path that produced the label
    pub source: RecommendationSource,
    /// Runner-up model predictions (empty for fallback)
    pub alternatives: Vec<ScoredLabel>,
}

impl RecommendationResult {
    /// Result from the keyword table.
    pub fn fallback(label: Specialty) -> Self {
        Self {
            label,
            confidence: None,
            emergency: label.is_emergency(),
            source: RecommendationSource::Fallback,
            alternatives: Vec::new(),
        }
    }

    /// Result from an accepted model prediction.
    pub fn from_model(top: ScoredLabel, alternatives: Vec<ScoredLabel>) -> Self {
        Self {
            label: top.label,
            confidence: Some(top.confidence),
            emergency: top.label.is_emergency(),
            source: RecommendationSource::Model,
            alternatives,
        }
    }

    /// Label as shown to patients, with the emergency marker when flagged.
    pub fn display_label(&self) -> String {
        if self.emergency {
            format!("{} {}", EMERGENCY_MARKER, self.label)
        } else {
            self.label.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_result_has_no_confidence() {
        let result = RecommendationResult::fallback(Specialty::Asthma);
        assert_eq!(result.source, RecommendationSource::Fallback);
        assert!(result.confidence.is_none());
        assert!(!result.emergency);
        assert!(result.alternatives.is_empty());
    }

    #[test]
    fn test_emergency_display_label() {
        let result = RecommendationResult::from_model(
            ScoredLabel::new(Specialty::Stroke, 0.91),
            vec![ScoredLabel::new(Specialty::Migraine, 0.05)],
        );
        assert!(result.emergency);
        assert_eq!(result.display_label(), "🚨 Stroke");

        let calm = RecommendationResult::fallback(Specialty::Flu);
        assert_eq!(calm.display_label(), "Flu");
    }
}
