//! Dataset preparation from CSV to files on disk.

use std::fs;

use mediqueue_core::clean_medical_text;
use mediqueue_core::recommender::labels_from_config;
use mediqueue_dataset::{
    parse_records, prepare, read_records, write_dataset, DatasetError, Example, PrepareOptions,
    LABELS_FILE, TRAIN_FILE, VALIDATION_FILE,
};
use proptest::prelude::*;

const SAMPLE_CSV: &str = "\
disease,symptoms
Psoriasis,\"Itchy, red patches on elbows\"
Asthma,Wheezing and cough at night
Psoriasis,Dry skin with silvery scales
Asthma,Pt c/o SOB after exercise
Migraine,Throbbing headache with nausea
Psoriasis,Thick red skin plaques
Asthma,Tight chest and cough
Migraine,Headache and dizziness in bright light
";

#[test]
fn test_prepare_and_write() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("symptoms.csv");
    fs::write(&csv_path, SAMPLE_CSV).unwrap();

    let records = read_records(&csv_path).unwrap();
    assert_eq!(records.len(), 8);

    let dataset = prepare(&records, &PrepareOptions::default()).unwrap();
    assert_eq!(dataset.source_rows, 8);
    assert_eq!(
        dataset.split.train.len() + dataset.split.validation.len(),
        24
    );

    let out = dir.path().join("data");
    write_dataset(&out, &dataset).unwrap();

    let train = fs::read_to_string(out.join(TRAIN_FILE)).unwrap();
    let examples: Vec<Example> = train
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(examples.len(), dataset.split.train.len());

    // Every label keeps at least one training example
    for id in 0..dataset.labels.len() {
        assert!(examples.iter().any(|e| e.label == id), "label {} missing", id);
    }

    let validation = fs::read_to_string(out.join(VALIDATION_FILE)).unwrap();
    assert_eq!(validation.lines().count(), dataset.split.validation.len());

    let labels = fs::read_to_string(out.join(LABELS_FILE)).unwrap();
    let order: Vec<&str> = labels_from_config(&labels)
        .unwrap()
        .iter()
        .map(|s| s.as_str())
        .collect();
    assert_eq!(order, vec!["Psoriasis", "Asthma", "Migraine"]);
}

#[test]
fn test_texts_match_inference_preprocessing() {
    let records = parse_records(SAMPLE_CSV).unwrap();
    let options = PrepareOptions {
        augment_factor: 0,
        ..PrepareOptions::default()
    };
    let dataset = prepare(&records, &options).unwrap();

    let mut texts: Vec<String> = dataset
        .split
        .train
        .iter()
        .chain(&dataset.split.validation)
        .map(|e| e.text.clone())
        .collect();
    texts.sort();

    let mut expected: Vec<String> = records
        .iter()
        .map(|r| clean_medical_text(&r.symptoms))
        .collect();
    expected.sort();

    assert_eq!(texts, expected);
    assert!(texts.contains(&"pt complains of shortness of breath after exercise".to_string()));
}

#[test]
fn test_unknown_disease_rejected() {
    let records = parse_records("disease,symptoms\nCommon Cold,sneezing\n").unwrap();
    assert!(matches!(
        prepare(&records, &PrepareOptions::default()),
        Err(DatasetError::UnknownLabel(_))
    ));
}

#[test]
fn test_invalid_fraction_rejected() {
    let records = parse_records(SAMPLE_CSV).unwrap();
    let options = PrepareOptions {
        validation_fraction: 1.0,
        ..PrepareOptions::default()
    };
    assert!(matches!(
        prepare(&records, &options),
        Err(DatasetError::InvalidOption(_))
    ));
}

proptest! {
    #[test]
    fn prop_split_keeps_every_label_in_training(
        counts in proptest::collection::vec(1usize..8, 1..5),
        fraction in 0.0f64..0.95,
    ) {
        let names = ["Flu", "Asthma", "Anemia", "Diabetes", "Stroke"];
        let mut csv = String::from("disease,symptoms\n");
        for (label, count) in counts.iter().enumerate() {
            for i in 0..*count {
                csv.push_str(&format!("{},symptom {}\n", names[label], i));
            }
        }

        let records = parse_records(&csv).unwrap();
        let options = PrepareOptions {
            augment_factor: 0,
            validation_fraction: fraction,
            seed: 42,
        };
        let dataset = prepare(&records, &options).unwrap();

        for id in 0..counts.len() {
            prop_assert!(dataset.split.train.iter().any(|e| e.label == id));
        }
    }
}
