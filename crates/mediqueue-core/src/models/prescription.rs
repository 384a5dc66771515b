//! Prescription models.

use serde::{Deserialize, Serialize};

/// A prescription issued at the end of an appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    /// Row ID
    pub id: i64,
    /// Appointment the prescription belongs to
    pub appointment_id: i64,
    /// Medicines, one per line as typed by the doctor
    pub medicines: String,
    /// Dosage/usage instructions
    pub instructions: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl Prescription {
    /// Non-empty medicine lines.
    pub fn medicine_lines(&self) -> Vec<&str> {
        self.medicines
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }
}
