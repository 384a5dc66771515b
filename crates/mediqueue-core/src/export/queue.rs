//! Queue snapshot export.

use serde::{Deserialize, Serialize};

use super::escape_csv;
use crate::models::QueueSnapshot;

/// Timestamped queue snapshot for hand-off to reporting tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueExport {
    /// Export timestamp
    pub exported_at: String,
    /// Waiting appointment count
    pub waiting: usize,
    /// Active alert count
    pub active_alerts: usize,
    pub snapshot: QueueSnapshot,
}

impl QueueExport {
    pub fn new(snapshot: QueueSnapshot) -> Self {
        Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            waiting: snapshot.entries.len(),
            active_alerts: snapshot.alerts.len(),
            snapshot,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export waiting appointments to CSV. Alerts are not included.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str("doctor_id,doctor,specialty,token,appointment_id,patient,phone,symptoms,payment_proof\n");

        for entry in &self.snapshot.entries {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{}\n",
                entry.doctor_id,
                escape_csv(&format!("Dr. {}", entry.doctor_name)),
                escape_csv(entry.specialty.as_str()),
                entry.token_number,
                entry.appointment_id,
                escape_csv(&entry.patient_name),
                escape_csv(&entry.patient_phone),
                escape_csv(&entry.symptoms),
                escape_csv(entry.payment_proof.as_deref().unwrap_or("")),
            ));
        }

        csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertStatus, EmergencyAlert, QueueEntry, Specialty};

    fn make_snapshot() -> QueueSnapshot {
        QueueSnapshot {
            entries: vec![
                QueueEntry {
                    appointment_id: 4,
                    token_number: 1,
                    symptoms: "red patches, itching".into(),
                    payment_proof: Some("ab12_upi.png".into()),
                    patient_name: "Asha".into(),
                    patient_phone: "9876543210".into(),
                    doctor_id: 1,
                    doctor_name: "Sharma".into(),
                    specialty: Specialty::Psoriasis,
                },
                QueueEntry {
                    appointment_id: 7,
                    token_number: 1,
                    symptoms: "wheezing".into(),
                    payment_proof: None,
                    patient_name: "Kiran \"KK\" Rao".into(),
                    patient_phone: "9123456780".into(),
                    doctor_id: 3,
                    doctor_name: "Kumar".into(),
                    specialty: Specialty::Asthma,
                },
            ],
            alerts: vec![EmergencyAlert {
                id: 1,
                patient_name: "Ravi".into(),
                patient_phone: "111".into(),
                symptoms: "collapsed".into(),
                status: AlertStatus::Active,
                created_at: "2024-01-15T10:00:00Z".into(),
            }],
        }
    }

    #[test]
    fn test_queue_export_csv() {
        let export = QueueExport::new(make_snapshot());
        let csv = export.to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3); // Header + 2 entries
        assert!(lines[0].starts_with("doctor_id,"));
        assert_eq!(
            lines[1],
            "1,Dr. Sharma,Psoriasis,1,4,Asha,9876543210,\"red patches, itching\",ab12_upi.png"
        );
        assert!(lines[2].contains("\"Kiran \"\"KK\"\" Rao\""));
        assert!(lines[2].ends_with(",wheezing,"));
    }

    #[test]
    fn test_queue_export_json() {
        let export = QueueExport::new(make_snapshot());
        assert_eq!(export.waiting, 2);
        assert_eq!(export.active_alerts, 1);

        let json = export.to_json().unwrap();
        assert!(json.contains("\"Psoriasis\""));
        assert!(json.contains("collapsed"));
    }
}
