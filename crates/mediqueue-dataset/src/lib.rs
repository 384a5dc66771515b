//! Training-data preparation for the specialty classifier.
//!
//! Reads a `disease,symptoms` CSV, augments it with synonym variants, cleans
//! every text with the same preprocessing the recommender applies at
//! inference time, assigns label ids and writes a stratified split.

pub mod augment;
pub mod labels;
pub mod reader;
pub mod split;
pub mod writer;

pub use augment::*;
pub use labels::*;
pub use reader::*;
pub use split::*;
pub use writer::*;

use mediqueue_core::{clean_medical_text, Specialty};
use thiserror::Error;

/// Dataset preparation errors.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error at line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("{0}")]
    UnknownLabel(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("No records to prepare")]
    Empty,
}

pub type DatasetResult<T> = Result<T, DatasetError>;

/// Preparation settings.
#[derive(Debug, Clone)]
pub struct PrepareOptions {
    /// Augmented variants per original row
    pub augment_factor: usize,
    /// Share of each label held out for validation
    pub validation_fraction: f64,
    pub seed: u64,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            augment_factor: 2,
            validation_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Labelled, cleaned and split examples ready to write.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub labels: LabelMap,
    pub split: Split,
    /// Rows read before augmentation
    pub source_rows: usize,
}

/// Run augmentation, cleaning, labelling and splitting.
pub fn prepare(records: &[SymptomRecord], options: &PrepareOptions) -> DatasetResult<PreparedDataset> {
    if records.is_empty() {
        return Err(DatasetError::Empty);
    }
    if !(0.0..1.0).contains(&options.validation_fraction) {
        return Err(DatasetError::InvalidOption(format!(
            "validation fraction must be in [0, 1), got {}",
            options.validation_fraction
        )));
    }

    let labels = LabelMap::from_records(records)?;
    let augmented = Augmenter::new(options.seed, options.augment_factor).augment(records);

    let mut examples = Vec::with_capacity(augmented.len());
    for record in &augmented {
        let (specialty, label) = record
            .disease
            .trim()
            .parse::<Specialty>()
            .ok()
            .and_then(|s| labels.id(s).map(|id| (s, id)))
            .ok_or_else(|| DatasetError::UnknownLabel(record.disease.clone()))?;
        examples.push(Example {
            text: clean_medical_text(&record.symptoms),
            label,
            label_name: specialty.to_string(),
        });
    }

    let split = split::stratified_split(examples, options.validation_fraction, options.seed);
    tracing::info!(
        source_rows = records.len(),
        augmented = augmented.len(),
        labels = labels.len(),
        train = split.train.len(),
        validation = split.validation.len(),
        "Dataset prepared"
    );

    Ok(PreparedDataset {
        labels,
        split,
        source_rows: records.len(),
    })
}
