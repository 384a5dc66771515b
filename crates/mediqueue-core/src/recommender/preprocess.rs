//! Medical text preprocessing shared by inference and training-data preparation.
//!
//! The classifier was fine-tuned on text passed through exactly this
//! function. Any change here must be matched by re-training.

use std::sync::OnceLock;

use regex::Regex;

/// Abbreviation expansions, applied in this order as plain substring
/// replacements (not word-bounded).
pub const MEDICAL_ABBREVIATIONS: [(&str, &str); 8] = [
    ("hr", "heart rate"),
    ("bp", "blood pressure"),
    ("temp", "temperature"),
    ("c/o", "complains of"),
    ("sob", "shortness of breath"),
    ("cp", "chest pain"),
    ("ha", "headache"),
    ("n/v", "nausea vomiting"),
];

fn non_word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\s]").expect("static pattern is valid"))
}

/// Normalize symptom text for the classifier.
///
/// Lower-cases, expands [`MEDICAL_ABBREVIATIONS`], replaces punctuation with
/// spaces and collapses whitespace.
pub fn clean_medical_text(text: &str) -> String {
    let mut text = text.to_lowercase();

    for (abbr, full) in MEDICAL_ABBREVIATIONS {
        text = text.replace(abbr, full);
    }

    let text = non_word_pattern().replace_all(&text, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
