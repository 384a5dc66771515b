//! Printable prescription slip.

use serde::{Deserialize, Serialize};

use crate::models::{Appointment, Doctor, Patient, Prescription};

/// Everything printed on a prescription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionSlip {
    pub patient: Patient,
    pub doctor: Doctor,
    pub appointment: Appointment,
    pub prescription: Prescription,
    /// Clinic-local issue time, e.g. "15-01-2024 03:45:10 PM"
    pub issued_at: String,
}

impl PrescriptionSlip {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text slip.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("MediQueue+ Prescription\n");
        out.push_str("=======================\n\n");

        out.push_str("Patient Details\n");
        out.push_str(&format!("  Name:  {}\n", self.patient.name));
        out.push_str(&format!("  Phone: {}\n", self.patient.phone));
        out.push_str(&format!("  Date:  {}\n", self.issued_at));
        out.push_str(&format!("  Token: {}\n\n", self.appointment.token_number));

        out.push_str("Diagnosis\n");
        out.push_str(&format!("  {}\n\n", self.appointment.symptoms.trim()));

        out.push_str("Prescribed Medicines\n");
        for line in self.prescription.medicine_lines() {
            out.push_str(&format!("  - {}\n", line));
        }

        if let Some(instructions) = self
            .prescription
            .instructions
            .as_deref()
            .filter(|i| !i.trim().is_empty())
        {
            out.push_str("\nAdditional Instructions\n");
            for line in instructions.lines() {
                out.push_str(&format!("  {}\n", line.trim_end()));
            }
        }

        out.push_str("\nDoctor's Signature\n");
        out.push_str(&format!("  {}\n", self.doctor.display_name()));
        out.push_str(&format!("  {}\n\n", self.doctor.specialty));

        out.push_str("This is a computer-generated prescription. No physical signature required.\n");
        out
    }
}
