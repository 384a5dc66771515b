//! Appointment and queue models.

use serde::{Deserialize, Serialize};

use super::emergency::EmergencyAlert;
use super::specialty::Specialty;

/// Appointment status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentStatus {
    /// In the doctor's token queue
    Waiting,
    /// Seen by the doctor
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Waiting => "waiting",
            AppointmentStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(AppointmentStatus::Waiting),
            "completed" => Some(AppointmentStatus::Completed),
            _ => None,
        }
    }
}

/// A booked appointment holding a token in one doctor's queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    /// Row ID
    pub id: i64,
    /// Patient row ID
    pub patient_id: i64,
    /// Doctor row ID
    pub doctor_id: i64,
    /// Per-doctor queue number
    pub token_number: i64,
    /// Symptoms as described by the patient
    pub symptoms: String,
    /// Status
    pub status: AppointmentStatus,
    /// Stored payment proof file name
    pub payment_proof: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl Appointment {
    pub fn is_waiting(&self) -> bool {
        self.status == AppointmentStatus::Waiting
    }
}

/// A waiting appointment joined with patient and doctor details, as the
/// doctor dashboard lists it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueEntry {
    pub appointment_id: i64,
    pub token_number: i64,
    pub symptoms: String,
    pub payment_proof: Option<String>,
    pub patient_name: String,
    pub patient_phone: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub specialty: Specialty,
}

/// Doctor dashboard view: every waiting appointment plus active alerts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueueSnapshot {
    /// Waiting appointments ordered by doctor then token
    pub entries: Vec<QueueEntry>,
    /// Active emergency alerts, oldest first
    pub alerts: Vec<EmergencyAlert>,
}

impl QueueSnapshot {
    /// Entries for one doctor, in token order.
    pub fn for_doctor(&self, doctor_id: i64) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter().filter(move |e| e.doctor_id == doctor_id)
    }
}
