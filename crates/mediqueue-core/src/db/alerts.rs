//! Emergency alert database operations.

use rusqlite::{params, OptionalExtension};

use super::{now, Database, DbError, DbResult};
use crate::models::{AlertStatus, EmergencyAlert};

impl Database {
    /// Record a new active alert.
    pub fn insert_alert(
        &self,
        patient_name: &str,
        patient_phone: &str,
        symptoms: &str,
    ) -> DbResult<EmergencyAlert> {
        let created_at = now();
        self.conn.execute(
            r#"
            INSERT INTO emergency_alerts (patient_name, patient_phone, symptoms, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                patient_name,
                patient_phone,
                symptoms,
                AlertStatus::Active.as_str(),
                created_at,
            ],
        )?;
        Ok(EmergencyAlert {
            id: self.conn.last_insert_rowid(),
            patient_name: patient_name.to_string(),
            patient_phone: patient_phone.to_string(),
            symptoms: symptoms.to_string(),
            status: AlertStatus::Active,
            created_at,
        })
    }

    /// Get an alert by ID.
    pub fn get_alert(&self, id: i64) -> DbResult<Option<EmergencyAlert>> {
        self.conn
            .query_row(
                r#"
                SELECT id, patient_name, patient_phone, symptoms, status, created_at
                FROM emergency_alerts
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok(AlertRow {
                        id: row.get(0)?,
                        patient_name: row.get(1)?,
                        patient_phone: row.get(2)?,
                        symptoms: row.get(3)?,
                        status: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Alerts with the given status, oldest first.
    pub fn list_alerts_by_status(&self, status: AlertStatus) -> DbResult<Vec<EmergencyAlert>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_name, patient_phone, symptoms, status, created_at
            FROM emergency_alerts
            WHERE status = ?
            ORDER BY created_at, id
            "#,
        )?;

        let rows = stmt.query_map([status.as_str()], |row| {
            Ok(AlertRow {
                id: row.get(0)?,
                patient_name: row.get(1)?,
                patient_phone: row.get(2)?,
                symptoms: row.get(3)?,
                status: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        let mut alerts = Vec::new();
        for row in rows {
            alerts.push(row?.try_into()?);
        }
        Ok(alerts)
    }

    /// Move an alert to a new status. Returns false for an unknown ID.
    pub fn set_alert_status(&self, id: i64, status: AlertStatus) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE emergency_alerts SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(rows_affected > 0)
    }
}

struct AlertRow {
    id: i64,
    patient_name: String,
    patient_phone: String,
    symptoms: String,
    status: String,
    created_at: String,
}

impl TryFrom<AlertRow> for EmergencyAlert {
    type Error = DbError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        let status = AlertStatus::parse(&row.status)
            .ok_or_else(|| DbError::Constraint(format!("Unknown alert status: {}", row.status)))?;

        Ok(EmergencyAlert {
            id: row.id,
            patient_name: row.patient_name,
            patient_phone: row.patient_phone,
            symptoms: row.symptoms,
            status,
            created_at: row.created_at,
        })
    }
}
