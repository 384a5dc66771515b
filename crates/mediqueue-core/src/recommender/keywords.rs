//! Keyword fallback matcher.
//!
//! Maps free-text symptoms to a specialty with an ordered phrase table:
//! - Phrase pass: first table phrase contained in the text wins
//! - Word pass: first text word (> 4 chars) contained in a table phrase wins
//! - Otherwise: General Physician
//!
//! Table order is the only precedence rule. Emergency phrases come first.

use crate::models::Specialty;

/// Words must be longer than this to take part in the word pass.
const MIN_WORD_CHARS: usize = 4;

/// Default symptom phrase table, in precedence order.
pub const DEFAULT_SYMPTOM_TABLE: [(&str, Specialty); 51] = [
    // Emergency/Critical
    ("chest pain", Specialty::HeartAttack),
    ("sharp chest pain", Specialty::HeartAttack),
    ("difficulty breathing", Specialty::HeartAttack),
    ("shortness of breath", Specialty::HeartAttack),
    ("sudden weakness", Specialty::Stroke),
    ("slurred speech", Specialty::Stroke),
    ("severe pain", Specialty::KidneyStones),
    // Respiratory
    ("cough", Specialty::Asthma),
    ("wheezing", Specialty::Asthma),
    ("asthma", Specialty::Asthma),
    ("breathing problem", Specialty::Asthma),
    // Skin
    ("skin rash", Specialty::Psoriasis),
    ("red patches", Specialty::Psoriasis),
    ("itching skin", Specialty::Psoriasis),
    ("dry skin", Specialty::Psoriasis),
    // Neurological
    ("headache", Specialty::Migraine),
    ("migraine", Specialty::Migraine),
    ("dizziness", Specialty::Migraine),
    // Gastrointestinal
    ("stomach pain", Specialty::Gastritis),
    ("abdominal pain", Specialty::Gastritis),
    ("nausea", Specialty::Gastritis),
    ("vomiting", Specialty::Gastritis),
    // Kidney
    ("kidney pain", Specialty::ChronicKidneyDisease),
    ("back pain", Specialty::ChronicKidneyDisease),
    ("urinary problems", Specialty::ChronicKidneyDisease),
    // Blood
    ("fatigue", Specialty::Anemia),
    ("weakness", Specialty::Anemia),
    ("pale skin", Specialty::Anemia),
    // Joints
    ("joint pain", Specialty::Osteoarthritis),
    ("swelling joints", Specialty::Osteoarthritis),
    ("stiffness", Specialty::Osteoarthritis),
    // Infectious
    ("fever", Specialty::Chickenpox),
    ("blisters", Specialty::Chickenpox),
    ("rash", Specialty::Chickenpox),
    // Diabetes
    ("thirst", Specialty::Diabetes),
    ("frequent urination", Specialty::Diabetes),
    // Veins
    ("swollen veins", Specialty::VaricoseVeins),
    ("leg pain", Specialty::VaricoseVeins),
    // Hypertension
    ("high blood pressure", Specialty::Hypertension),
    ("blood pressure", Specialty::Hypertension),
    // COVID
    ("covid", Specialty::Covid19),
    ("loss of taste", Specialty::Covid19),
    ("loss of smell", Specialty::Covid19),
    // TB
    ("tuberculosis", Specialty::Tuberculosis),
    ("blood in sputum", Specialty::Tuberculosis),
    // Allergy
    ("sneezing", Specialty::Allergy),
    ("runny nose", Specialty::Allergy),
    ("allergic", Specialty::Allergy),
    // Mental Health
    ("depression", Specialty::Depression),
    ("sadness", Specialty::Depression),
    ("anxiety", Specialty::Depression),
];

/// How the matcher reached its answer.
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordMatch {
    /// A table phrase appears in the text
    Phrase { phrase: String, specialty: Specialty },
    /// A text word appears inside a table phrase
    Word { word: String, phrase: String, specialty: Specialty },
    /// Nothing matched
    Default,
}

impl KeywordMatch {
    pub fn specialty(&self) -> Specialty {
        match self {
            KeywordMatch::Phrase { specialty, .. } | KeywordMatch::Word { specialty, .. } => {
                *specialty
            }
            KeywordMatch::Default => Specialty::DEFAULT,
        }
    }
}

/// Deterministic symptom → specialty matcher.
pub struct KeywordMatcher {
    /// Ordered (phrase, specialty) pairs; phrases are lowercase
    table: Vec<(String, Specialty)>,
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordMatcher {
    /// Create a matcher with the default symptom table.
    pub fn new() -> Self {
        Self {
            table: DEFAULT_SYMPTOM_TABLE
                .iter()
                .map(|(phrase, specialty)| (phrase.to_string(), *specialty))
                .collect(),
        }
    }

    /// Recommend a specialty. Never fails.
    pub fn recommend(&self, symptoms: &str) -> Specialty {
        self.explain(symptoms).specialty()
    }

    /// Recommend a specialty and report which rule fired.
    pub fn explain(&self, symptoms: &str) -> KeywordMatch {
        let lower = symptoms.to_lowercase();

        if let Some((phrase, specialty)) = self.match_phrase(&lower) {
            return KeywordMatch::Phrase {
                phrase: phrase.to_string(),
                specialty,
            };
        }

        if let Some((word, phrase, specialty)) = self.match_word(&lower) {
            return KeywordMatch::Word {
                word: word.to_string(),
                phrase: phrase.to_string(),
                specialty,
            };
        }

        KeywordMatch::Default
    }

    /// First table phrase that occurs in the text.
    fn match_phrase(&self, lower: &str) -> Option<(&str, Specialty)> {
        self.table
            .iter()
            .find(|(phrase, _)| lower.contains(phrase.as_str()))
            .map(|(phrase, specialty)| (phrase.as_str(), *specialty))
    }

    /// First long-enough word that occurs inside a table phrase.
    ///
    /// The containment runs word ⊂ phrase, not phrase ⊂ word: "breathing"
    /// matches "difficulty breathing", but "coughing" matches nothing.
    fn match_word<'t>(&self, lower: &'t str) -> Option<(&'t str, &str, Specialty)> {
        for word in lower.split_whitespace() {
            if word.chars().count() <= MIN_WORD_CHARS {
                continue;
            }
            if let Some((phrase, specialty)) =
                self.table.iter().find(|(phrase, _)| phrase.contains(word))
            {
                return Some((word, phrase.as_str(), *specialty));
            }
        }
        None
    }

    /// Append a phrase at the lowest precedence.
    pub fn add_phrase(&mut self, phrase: &str, specialty: Specialty) {
        self.table.push((phrase.to_lowercase(), specialty));
    }

    /// Ordered phrase table.
    pub fn table(&self) -> &[(String, Specialty)] {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_match_is_case_insensitive() {
        let matcher = KeywordMatcher::new();
        assert_eq!(
            matcher.recommend("Sudden CHEST PAIN since morning"),
            Specialty::HeartAttack
        );
    }

    #[test]
    fn test_red_patches_psoriasis() {
        let matcher = KeywordMatcher::new();
        assert_eq!(
            matcher.recommend("My skin has red patches and it's itching"),
            Specialty::Psoriasis
        );
    }

    #[test]
    fn test_no_keyword_defaults_to_general_physician() {
        let matcher = KeywordMatcher::new();
        let result = matcher.explain("I feel generally unwell today");
        assert_eq!(result, KeywordMatch::Default);
        assert_eq!(result.specialty(), Specialty::GeneralPhysician);
    }

    #[test]
    fn test_table_order_breaks_ties() {
        let matcher = KeywordMatcher::new();
        // "headache" (Migraine) precedes "fever" (Chickenpox) in the table.
        assert_eq!(matcher.recommend("fever and headache"), Specialty::Migraine);
        // "cough" precedes everything respiratory or infectious after it.
        assert_eq!(matcher.recommend("fever, rash and cough"), Specialty::Asthma);
        // Emergency phrases win over anything later.
        assert_eq!(
            matcher.recommend("anxiety with shortness of breath"),
            Specialty::HeartAttack
        );
    }

    #[test]
    fn test_substring_phrase_matching() {
        let matcher = KeywordMatcher::new();
        // "rash" is a substring of "crashing".
        assert_eq!(matcher.recommend("I keep crashing"), Specialty::Chickenpox);
    }

    #[test]
    fn test_word_pass_word_inside_phrase() {
        let matcher = KeywordMatcher::new();
        let result = matcher.explain("trouble breathing lately");
        assert_eq!(
            result,
            KeywordMatch::Word {
                word: "breathing".into(),
                phrase: "difficulty breathing".into(),
                specialty: Specialty::HeartAttack,
            }
        );
    }

    #[test]
    fn test_word_pass_ignores_short_words() {
        let matcher = KeywordMatcher::new();
        // "pale" is in "pale skin" but only four characters long.
        assert_eq!(matcher.recommend("looks pale"), Specialty::GeneralPhysician);
        // "veins" is five characters and sits inside "swollen veins".
        assert_eq!(matcher.recommend("bulging veins"), Specialty::VaricoseVeins);
    }

    #[test]
    fn test_word_pass_does_not_match_phrase_inside_word() {
        let matcher = KeywordMatcher::new();
        // "coughing" only matches through the phrase pass ("cough" ⊂ "coughing").
        assert!(matches!(matcher.explain("coughing"), KeywordMatch::Phrase { .. }));
        // "wheezy" is not contained by "wheezing", so the word pass finds nothing.
        assert_eq!(matcher.recommend("wheezy"), Specialty::GeneralPhysician);
    }

    #[test]
    fn test_word_pass_keeps_punctuation() {
        let matcher = KeywordMatcher::new();
        // Whitespace tokenisation keeps the comma, so "kidney," is not in any phrase.
        assert_eq!(matcher.recommend("kidney, left side"), Specialty::GeneralPhysician);
        assert_eq!(
            matcher.recommend("kidney left side"),
            Specialty::ChronicKidneyDisease
        );
        assert_eq!(
            matcher.recommend("urinary issue"),
            Specialty::ChronicKidneyDisease
        );
    }

    #[test]
    fn test_custom_phrase_has_lowest_precedence() {
        let mut matcher = KeywordMatcher::new();
        matcher.add_phrase("Palpitations", Specialty::Hypertension);

        assert_eq!(matcher.recommend("palpitations"), Specialty::Hypertension);
        assert_eq!(matcher.recommend("palpitations and cough"), Specialty::Asthma);
        assert_eq!(matcher.table().len(), DEFAULT_SYMPTOM_TABLE.len() + 1);
    }

    #[test]
    fn test_emergency_phrases_lead_the_table() {
        assert!(DEFAULT_SYMPTOM_TABLE[..6].iter().all(|(_, s)| s.is_emergency()));
        assert_eq!(DEFAULT_SYMPTOM_TABLE[6], ("severe pain", Specialty::KidneyStones));
        assert!(DEFAULT_SYMPTOM_TABLE
            .iter()
            .all(|(phrase, _)| *phrase == phrase.to_lowercase()));
    }
}
