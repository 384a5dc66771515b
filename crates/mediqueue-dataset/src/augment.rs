//! Synonym-replacement augmentation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::reader::SymptomRecord;

/// Symptom words and the alternatives a variant may use instead.
pub const SYMPTOM_SYNONYMS: [(&str, &[&str]); 10] = [
    ("pain", &["discomfort", "ache"]),
    ("fever", &["high temperature"]),
    ("cough", &["coughing"]),
    ("headache", &["migraine"]),
    ("nausea", &["sickness"]),
    ("vomiting", &["throwing up"]),
    ("fatigue", &["tiredness"]),
    ("dizziness", &["vertigo"]),
    ("rash", &["skin eruption"]),
    ("swelling", &["edema"]),
];

/// Chance that a present synonym word is replaced in a variant.
pub const REPLACE_PROBABILITY: f64 = 0.3;

/// Seeded generator of augmented symptom texts.
pub struct Augmenter {
    rng: StdRng,
    factor: usize,
}

impl Augmenter {
    /// `factor` variants are produced per original record.
    pub fn new(seed: u64, factor: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            factor,
        }
    }

    /// One variant of `text`, lower-cased.
    ///
    /// Every occurrence of a chosen word is replaced with the same synonym.
    pub fn variant(&mut self, text: &str) -> String {
        let mut out = text.to_lowercase();
        for (word, synonyms) in SYMPTOM_SYNONYMS {
            if !out.contains(word) || !self.rng.gen_bool(REPLACE_PROBABILITY) {
                continue;
            }
            if let Some(synonym) = synonyms.choose(&mut self.rng) {
                out = out.replace(word, synonym);
            }
        }
        out
    }

    /// Originals followed by their variants, record by record.
    pub fn augment(&mut self, records: &[SymptomRecord]) -> Vec<SymptomRecord> {
        let mut out = Vec::with_capacity(records.len() * (self.factor + 1));
        for record in records {
            out.push(record.clone());
            for _ in 0..self.factor {
                let symptoms = self.variant(&record.symptoms);
                out.push(SymptomRecord::new(record.disease.clone(), symptoms));
            }
        }
        out
    }
}
