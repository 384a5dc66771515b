//! Patient and doctor models.

use serde::{Deserialize, Serialize};

use super::specialty::Specialty;

/// A patient who booked at least one appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Row ID
    pub id: i64,
    /// Patient name as entered at registration
    pub name: String,
    /// Contact phone number
    pub phone: String,
    /// Creation timestamp
    pub created_at: String,
}

/// A doctor in the clinic directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    /// Row ID
    pub id: i64,
    /// Surname shown as "Dr. {name}"
    pub name: String,
    /// Specialty the doctor is tagged with
    pub specialty: Specialty,
}

impl Doctor {
    /// Name with honorific, as shown in the directory.
    pub fn display_name(&self) -> String {
        format!("Dr. {}", self.name)
    }
}

/// Doctors seeded into an empty directory.
pub const SEED_DOCTORS: [(&str, Specialty); 20] = [
    ("Sharma", Specialty::Psoriasis),
    ("Patel", Specialty::VaricoseVeins),
    ("Kumar", Specialty::Asthma),
    ("Gupta", Specialty::ChronicKidneyDisease),
    ("Singh", Specialty::Migraine),
    ("Reddy", Specialty::Gastritis),
    ("Yadav", Specialty::Anemia),
    ("Pal", Specialty::Osteoarthritis),
    ("Gour", Specialty::Chickenpox),
    ("Verma", Specialty::Diabetes),
    ("Tiwari", Specialty::Hypertension),
    ("Mishra", Specialty::GeneralPhysician),
    ("Saxena", Specialty::Covid19),
    ("Thakur", Specialty::Tuberculosis),
    ("Dubey", Specialty::Allergy),
    ("Shukla", Specialty::Depression),
    ("Bajpai", Specialty::HeartAttack),
    ("Khanna", Specialty::Stroke),
    ("Mehra", Specialty::KidneyStones),
    ("Joshi", Specialty::GeneralPhysician),
];
