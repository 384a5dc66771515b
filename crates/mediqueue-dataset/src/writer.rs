//! Dataset file output.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::split::Example;
use crate::{DatasetResult, PreparedDataset};

pub const TRAIN_FILE: &str = "train.jsonl";
pub const VALIDATION_FILE: &str = "validation.jsonl";
pub const LABELS_FILE: &str = "labels.json";

/// Paths written by [`write_dataset`].
#[derive(Debug, Clone)]
pub struct DatasetFiles {
    pub train: PathBuf,
    pub validation: PathBuf,
    pub labels: PathBuf,
}

/// One JSON object per line.
pub fn write_jsonl(path: &Path, examples: &[Example]) -> DatasetResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for example in examples {
        serde_json::to_writer(&mut out, example)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Write the split and label map into `dir`, creating it if needed.
pub fn write_dataset(dir: &Path, dataset: &PreparedDataset) -> DatasetResult<DatasetFiles> {
    fs::create_dir_all(dir)?;
    let files = DatasetFiles {
        train: dir.join(TRAIN_FILE),
        validation: dir.join(VALIDATION_FILE),
        labels: dir.join(LABELS_FILE),
    };

    write_jsonl(&files.train, &dataset.split.train)?;
    write_jsonl(&files.validation, &dataset.split.validation)?;
    fs::write(&files.labels, dataset.labels.to_json()?)?;

    tracing::info!(dir = %dir.display(), "Dataset written");
    Ok(files)
}
