//! Clinical specialty labels.
//!
//! The label set is closed: every recommendation, doctor record and model
//! output is one of these twenty values. Free text never leaves this module
//! as a label.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;
use thiserror::Error;

/// Decorative marker prepended to emergency labels for display.
pub const EMERGENCY_MARKER: &str = "🚨";

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// A clinical specialty a doctor is tagged with and symptoms are mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Specialty {
    Psoriasis,
    VaricoseVeins,
    Asthma,
    ChronicKidneyDisease,
    Migraine,
    Gastritis,
    Anemia,
    Osteoarthritis,
    Chickenpox,
    Diabetes,
    Hypertension,
    Flu,
    Covid19,
    Tuberculosis,
    Allergy,
    Depression,
    HeartAttack,
    Stroke,
    KidneyStones,
    GeneralPhysician,
}

impl Specialty {
    /// Every specialty, in canonical order.
    pub const ALL: [Specialty; 20] = [
        Specialty::Psoriasis,
        Specialty::VaricoseVeins,
        Specialty::Asthma,
        Specialty::ChronicKidneyDisease,
        Specialty::Migraine,
        Specialty::Gastritis,
        Specialty::Anemia,
        Specialty::Osteoarthritis,
        Specialty::Chickenpox,
        Specialty::Diabetes,
        Specialty::Hypertension,
        Specialty::Flu,
        Specialty::Covid19,
        Specialty::Tuberculosis,
        Specialty::Allergy,
        Specialty::Depression,
        Specialty::HeartAttack,
        Specialty::Stroke,
        Specialty::KidneyStones,
        Specialty::GeneralPhysician,
    ];

    /// Conditions that raise the emergency flag.
    pub const EMERGENCIES: [Specialty; 3] =
        [Specialty::HeartAttack, Specialty::Stroke, Specialty::Covid19];

    /// Label used when nothing more specific is known.
    pub const DEFAULT: Specialty = Specialty::GeneralPhysician;

    /// Canonical display name (also the stored and model label string).
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::Psoriasis => "Psoriasis",
            Specialty::VaricoseVeins => "Varicose Veins",
            Specialty::Asthma => "Asthma",
            Specialty::ChronicKidneyDisease => "Chronic Kidney Disease",
            Specialty::Migraine => "Migraine",
            Specialty::Gastritis => "Gastritis",
            Specialty::Anemia => "Anemia",
            Specialty::Osteoarthritis => "Osteoarthritis",
            Specialty::Chickenpox => "Chickenpox",
            Specialty::Diabetes => "Diabetes",
            Specialty::Hypertension => "Hypertension",
            Specialty::Flu => "Flu",
            Specialty::Covid19 => "COVID-19",
            Specialty::Tuberculosis => "Tuberculosis",
            Specialty::Allergy => "Allergy",
            Specialty::Depression => "Depression",
            Specialty::HeartAttack => "Heart Attack",
            Specialty::Stroke => "Stroke",
            Specialty::KidneyStones => "Kidney Stones",
            Specialty::GeneralPhysician => "General Physician",
        }
    }

    /// Whether this specialty is in the emergency subset.
    pub fn is_emergency(&self) -> bool {
        Self::EMERGENCIES.contains(self)
    }

    /// Closest known label to an arbitrary string, if any is close enough.
    pub fn suggest(input: &str) -> Option<Specialty> {
        let lower = input.trim().to_lowercase();
        Self::ALL
            .iter()
            .map(|s| (*s, jaro_winkler(&lower, &s.as_str().to_lowercase())))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(s, _)| s)
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a string that is not one of the known specialties.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown specialty '{input}'{}", suggestion_hint(.suggestion))]
pub struct SpecialtyParseError {
    pub input: String,
    pub suggestion: Option<Specialty>,
}

fn suggestion_hint(suggestion: &Option<Specialty>) -> String {
    suggestion
        .map(|s| format!(" (did you mean '{}'?)", s))
        .unwrap_or_default()
}

impl FromStr for Specialty {
    type Err = SpecialtyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = strip_emergency_marker(s);
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.as_str() == cleaned)
            .ok_or_else(|| SpecialtyParseError {
                input: s.to_string(),
                suggestion: Self::suggest(&cleaned),
            })
    }
}

impl TryFrom<String> for Specialty {
    type Error = SpecialtyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Specialty> for String {
    fn from(value: Specialty) -> Self {
        value.as_str().to_string()
    }
}

/// Remove the decorative emergency marker so a displayed label can be used
/// for an exact directory lookup.
pub fn strip_emergency_marker(label: &str) -> String {
    label.replace(EMERGENCY_MARKER, "").trim().to_string()
}
