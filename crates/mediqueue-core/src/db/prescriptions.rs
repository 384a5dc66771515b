//! Prescription database operations.

use rusqlite::{params, OptionalExtension};

use super::{now, Database, DbError, DbResult};
use crate::models::Prescription;

impl Database {
    /// Store a prescription for an existing appointment.
    pub fn insert_prescription(
        &self,
        appointment_id: i64,
        medicines: &str,
        instructions: Option<&str>,
    ) -> DbResult<Prescription> {
        if self.get_appointment(appointment_id)?.is_none() {
            return Err(DbError::NotFound(format!("Appointment {}", appointment_id)));
        }

        let created_at = now();
        self.conn.execute(
            r#"
            INSERT INTO prescriptions (appointment_id, medicines, instructions, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![appointment_id, medicines, instructions, created_at],
        )?;
        Ok(Prescription {
            id: self.conn.last_insert_rowid(),
            appointment_id,
            medicines: medicines.to_string(),
            instructions: instructions.map(str::to_string),
            created_at,
        })
    }

    /// First prescription written for an appointment. Later ones are kept
    /// but never shown.
    pub fn first_prescription(&self, appointment_id: i64) -> DbResult<Option<Prescription>> {
        self.conn
            .query_row(
                r#"
                SELECT id, appointment_id, medicines, instructions, created_at
                FROM prescriptions
                WHERE appointment_id = ?
                ORDER BY id ASC
                LIMIT 1
                "#,
                [appointment_id],
                |row| {
                    Ok(Prescription {
                        id: row.get(0)?,
                        appointment_id: row.get(1)?,
                        medicines: row.get(2)?,
                        instructions: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewAppointment;

    fn db_with_appointment() -> (Database, i64) {
        let mut db = Database::open_in_memory().unwrap();
        let (_, appointment) = db
            .book_appointment(&NewAppointment {
                patient_name: "Kiran".into(),
                patient_phone: "9123456780".into(),
                doctor_id: 1,
                symptoms: "itchy skin".into(),
                payment_proof: None,
            })
            .unwrap();
        (db, appointment.id)
    }

    #[test]
    fn test_first_prescription_wins() {
        let (db, id) = db_with_appointment();
        let first = db.insert_prescription(id, "Calamine lotion", None).unwrap();
        db.insert_prescription(id, "Cetirizine 10mg", Some("Once at night"))
            .unwrap();

        let shown = db.first_prescription(id).unwrap().unwrap();
        assert_eq!(shown, first);
        assert_eq!(shown.medicines, "Calamine lotion");
    }

    #[test]
    fn test_prescription_requires_appointment() {
        let db = Database::open_in_memory().unwrap();
        let result = db.insert_prescription(42, "Paracetamol", None);
        assert!(matches!(result, Err(DbError::NotFound(_))));
        assert!(db.first_prescription(42).unwrap().is_none());
    }
}
