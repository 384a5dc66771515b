//! Golden tests for the specialty recommender.
//!
//! These tests pin keyword-table answers for known symptom texts and check
//! the model/fallback policy end to end.

use std::path::PathBuf;
use std::sync::Arc;

use mediqueue_core::models::{RecommendationSource, ScoredLabel, Specialty};
use mediqueue_core::recommender::{
    ClassifierError, KeywordMatcher, LazyClassifier, MockClassifier, Recommender,
    DEFAULT_SYMPTOM_TABLE,
};
use proptest::prelude::*;

/// Test case from golden file.
struct GoldenCase {
    id: &'static str,
    symptoms: &'static str,
    expected: Specialty,
    emergency: bool,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "chest-pain",
            symptoms: "I have sharp chest pain since an hour",
            expected: Specialty::HeartAttack,
            emergency: true,
        },
        GoldenCase {
            id: "slurred-speech",
            symptoms: "Slurred speech since morning",
            expected: Specialty::Stroke,
            emergency: true,
        },
        GoldenCase {
            id: "severe-pain-beats-back-pain",
            symptoms: "severe pain in lower back pain area",
            expected: Specialty::KidneyStones,
            emergency: false,
        },
        GoldenCase {
            id: "dry-cough",
            symptoms: "dry cough at night",
            expected: Specialty::Asthma,
            emergency: false,
        },
        GoldenCase {
            id: "red-patches",
            symptoms: "Red patches on both elbows",
            expected: Specialty::Psoriasis,
            emergency: false,
        },
        GoldenCase {
            id: "headache-before-nausea",
            symptoms: "constant headache and nausea",
            expected: Specialty::Migraine,
            emergency: false,
        },
        GoldenCase {
            id: "fever-blisters",
            symptoms: "fever with itchy blisters",
            expected: Specialty::Chickenpox,
            emergency: false,
        },
        GoldenCase {
            id: "loss-of-smell",
            symptoms: "sudden loss of smell and taste",
            expected: Specialty::Covid19,
            emergency: true,
        },
        GoldenCase {
            id: "allergy",
            symptoms: "sneezing and runny nose every spring",
            expected: Specialty::Allergy,
            emergency: false,
        },
        GoldenCase {
            id: "word-pass-joints",
            symptoms: "my joints ache",
            expected: Specialty::Osteoarthritis,
            emergency: false,
        },
        GoldenCase {
            id: "word-pass-breathing",
            symptoms: "breathing hard",
            expected: Specialty::HeartAttack,
            emergency: true,
        },
        GoldenCase {
            id: "no-match",
            symptoms: "hello there",
            expected: Specialty::GeneralPhysician,
            emergency: false,
        },
        GoldenCase {
            id: "empty",
            symptoms: "",
            expected: Specialty::GeneralPhysician,
            emergency: false,
        },
    ]
}

#[test]
fn test_golden_cases() {
    let recommender = Recommender::keyword_only();

    for case in get_golden_cases() {
        let result = recommender.recommend(case.symptoms);

        assert_eq!(result.label, case.expected, "Case {}: label mismatch", case.id);
        assert_eq!(
            result.emergency, case.emergency,
            "Case {}: emergency flag mismatch", case.id
        );
        assert_eq!(result.source, RecommendationSource::Fallback, "Case {}", case.id);
        assert_eq!(result.confidence, None, "Case {}", case.id);
    }
}

#[test]
fn test_default_table_size() {
    assert_eq!(DEFAULT_SYMPTOM_TABLE.len(), 51);
    assert_eq!(KeywordMatcher::new().table().len(), 51);
}

fn with_mock(mock: MockClassifier) -> (Recommender, Arc<MockClassifier>) {
    let mock = Arc::new(mock);
    let recommender = Recommender::with_classifier(LazyClassifier::ready(mock.clone()));
    (recommender, mock)
}

#[test]
fn test_confident_model_wins() {
    let (recommender, mock) = with_mock(MockClassifier::ranking(vec![
        ScoredLabel::new(Specialty::Psoriasis, 0.91),
        ScoredLabel::new(Specialty::Allergy, 0.05),
        ScoredLabel::new(Specialty::GeneralPhysician, 0.02),
    ]));

    // Keyword table alone would say Chickenpox ("fever")
    let result = recommender.recommend("Fever, itchy red skin");

    assert_eq!(result.label, Specialty::Psoriasis);
    assert_eq!(result.source, RecommendationSource::Model);
    assert_eq!(result.confidence, Some(0.91));
    assert_eq!(result.alternatives.len(), 2);
    assert!(!result.emergency);
    assert_eq!(mock.last_input().as_deref(), Some("fever itchy red skin"));
}

#[test]
fn test_model_emergency_flag_follows_label() {
    let (recommender, _mock) = with_mock(MockClassifier::ranking(vec![ScoredLabel::new(
        Specialty::Stroke,
        0.77,
    )]));

    let result = recommender.recommend("face drooping on one side");
    assert_eq!(result.label, Specialty::Stroke);
    assert!(result.emergency);
    assert_eq!(result.display_label(), "🚨 Stroke");
}

#[test]
fn test_model_covid_at_threshold_is_emergency() {
    let (recommender, _mock) = with_mock(MockClassifier::ranking(vec![
        ScoredLabel::new(Specialty::Covid19, 0.5),
        ScoredLabel::new(Specialty::Flu, 0.3),
    ]));

    let result = recommender.recommend("loss of smell and dry cough for five days");
    assert_eq!(result.label, Specialty::Covid19);
    assert_eq!(result.confidence, Some(0.5));
    assert!(result.emergency);
    assert_eq!(result.display_label(), "🚨 COVID-19");
}

#[test]
fn test_low_confidence_equals_fallback() {
    let (recommender, mock) = with_mock(MockClassifier::ranking(vec![
        ScoredLabel::new(Specialty::Stroke, 0.31),
        ScoredLabel::new(Specialty::Migraine, 0.29),
    ]));
    let keyword = Recommender::keyword_only();

    for symptoms in ["headache and dizziness", "red patches", "nothing specific"] {
        assert_eq!(recommender.recommend(symptoms), keyword.recommend(symptoms));
    }
    assert_eq!(mock.calls(), 3);
}

#[test]
fn test_inference_error_falls_back() {
    let (recommender, _mock) = with_mock(MockClassifier::failing(ClassifierError::Inference(
        "session closed".into(),
    )));

    let result = recommender.recommend("wheezing at night");
    assert_eq!(result.label, Specialty::Asthma);
    assert_eq!(result.source, RecommendationSource::Fallback);
}

#[test]
fn test_load_failure_falls_back_every_time() {
    let recommender = Recommender::with_classifier(LazyClassifier::new(Box::new(|| {
        Err(ClassifierError::ModelNotFound(PathBuf::from("/missing/model.onnx")))
    })));

    for _ in 0..3 {
        let result = recommender.recommend("joint pain and stiffness");
        assert_eq!(result.label, Specialty::Osteoarthritis);
        assert_eq!(result.source, RecommendationSource::Fallback);
    }
}

#[test]
fn test_missing_model_dir_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let recommender = Recommender::with_model_dir(dir.path().join("no-model-here"));

    let result = recommender.recommend("high blood pressure readings");
    assert_eq!(result.label, Specialty::Hypertension);
    assert_eq!(result.source, RecommendationSource::Fallback);
}

proptest! {
    #[test]
    fn prop_recommend_is_total_and_closed(symptoms in "\\PC{0,80}") {
        let result = Recommender::keyword_only().recommend(&symptoms);
        prop_assert!(Specialty::ALL.contains(&result.label));
        prop_assert_eq!(result.emergency, result.label.is_emergency());
    }

    #[test]
    fn prop_recommend_is_deterministic(symptoms in "[a-z ]{0,60}") {
        let recommender = Recommender::keyword_only();
        prop_assert_eq!(recommender.recommend(&symptoms), recommender.recommend(&symptoms));
    }

    #[test]
    fn prop_low_confidence_never_changes_answer(
        symptoms in "[a-z ]{0,60}",
        confidence in 0.0f64..0.5,
    ) {
        let mock = Arc::new(MockClassifier::ranking(vec![ScoredLabel::new(
            Specialty::Flu,
            confidence,
        )]));
        let recommender = Recommender::with_classifier(LazyClassifier::ready(mock));
        prop_assert_eq!(
            recommender.recommend(&symptoms),
            Recommender::keyword_only().recommend(&symptoms)
        );
    }
}
