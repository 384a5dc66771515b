//! Stratified train/validation split.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// One training example, as written to the JSONL files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Preprocessed symptom text
    pub text: String,
    /// Label id
    pub label: usize,
    pub label_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct Split {
    pub train: Vec<Example>,
    pub validation: Vec<Example>,
}

/// Hold out `round(n * fraction)` examples of each label for validation,
/// always leaving at least one in training.
pub fn stratified_split(examples: Vec<Example>, fraction: f64, seed: u64) -> Split {
    let mut by_label: BTreeMap<usize, Vec<Example>> = BTreeMap::new();
    for example in examples {
        by_label.entry(example.label).or_default().push(example);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut split = Split::default();
    for (_, mut group) in by_label {
        group.shuffle(&mut rng);
        let n = group.len();
        let held = ((n as f64 * fraction).round() as usize).min(n.saturating_sub(1));

        let train = group.split_off(held);
        split.validation.extend(group);
        split.train.extend(train);
    }
    split
}

#[cfg(test)]
mod tests {
    use super::*;

    fn examples(label: usize, count: usize) -> Vec<Example> {
        (0..count)
            .map(|i| Example {
                text: format!("text {} {}", label, i),
                label,
                label_name: format!("label {}", label),
            })
            .collect()
    }

    #[test]
    fn test_split_sizes_per_label() {
        let mut all = examples(0, 10);
        all.extend(examples(1, 5));
        all.extend(examples(2, 1));

        let split = stratified_split(all, 0.2, 42);
        let count = |v: &[Example], label| v.iter().filter(|e| e.label == label).count();

        assert_eq!(count(&split.validation, 0), 2);
        assert_eq!(count(&split.validation, 1), 1);
        // A singleton label stays in training
        assert_eq!(count(&split.validation, 2), 0);
        assert_eq!(count(&split.train, 2), 1);
        assert_eq!(split.train.len() + split.validation.len(), 16);
    }

    #[test]
    fn test_split_is_seeded() {
        let a = stratified_split(examples(0, 20), 0.2, 42);
        let b = stratified_split(examples(0, 20), 0.2, 42);
        assert_eq!(a.validation, b.validation);
    }

    #[test]
    fn test_full_fraction_keeps_one() {
        let split = stratified_split(examples(0, 4), 1.0, 42);
        assert_eq!(split.train.len(), 1);
        assert_eq!(split.validation.len(), 3);
    }
}
