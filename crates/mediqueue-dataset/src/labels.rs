//! Label id assignment.

use std::collections::BTreeMap;

use mediqueue_core::models::Specialty;
use serde::Serialize;

use crate::reader::SymptomRecord;
use crate::{DatasetError, DatasetResult};

/// Specialties in id order. Ids follow first appearance in the data.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap {
    labels: Vec<Specialty>,
}

/// `labels.json` layout, the same `id2label` shape a model `config.json` carries.
#[derive(Debug, Serialize)]
struct LabelFile {
    id2label: BTreeMap<usize, &'static str>,
    label2id: BTreeMap<&'static str, usize>,
}

impl LabelMap {
    /// Assign ids to every disease in `records`. Unknown names are an error.
    pub fn from_records(records: &[SymptomRecord]) -> DatasetResult<Self> {
        let mut labels: Vec<Specialty> = Vec::new();
        for record in records {
            let specialty: Specialty = record
                .disease
                .trim()
                .parse()
                .map_err(|e: mediqueue_core::models::SpecialtyParseError| {
                    DatasetError::UnknownLabel(e.to_string())
                })?;
            if !labels.contains(&specialty) {
                labels.push(specialty);
            }
        }
        Ok(Self { labels })
    }

    pub fn id(&self, specialty: Specialty) -> Option<usize> {
        self.labels.iter().position(|s| *s == specialty)
    }

    pub fn labels(&self) -> &[Specialty] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let file = LabelFile {
            id2label: self
                .labels
                .iter()
                .enumerate()
                .map(|(id, s)| (id, s.as_str()))
                .collect(),
            label2id: self
                .labels
                .iter()
                .enumerate()
                .map(|(id, s)| (s.as_str(), id))
                .collect(),
        };
        serde_json::to_string_pretty(&file)
    }
}
