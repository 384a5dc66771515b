//! Patient database operations.

use rusqlite::{params, Connection, OptionalExtension};

use super::{now, Database, DbResult};
use crate::models::Patient;

impl Database {
    /// Register a patient.
    pub fn insert_patient(&self, name: &str, phone: &str) -> DbResult<Patient> {
        insert_patient_on(&self.conn, name, phone)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: i64) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                "SELECT id, name, phone, created_at FROM patients WHERE id = ?",
                [id],
                |row| {
                    Ok(Patient {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        phone: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }
}

/// Insert a patient on any connection (plain or inside a transaction).
pub(super) fn insert_patient_on(conn: &Connection, name: &str, phone: &str) -> DbResult<Patient> {
    let created_at = now();
    conn.execute(
        "INSERT INTO patients (name, phone, created_at) VALUES (?1, ?2, ?3)",
        params![name, phone, created_at],
    )?;
    Ok(Patient {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        phone: phone.to_string(),
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get_patient() {
        let db = Database::open_in_memory().unwrap();
        let patient = db.insert_patient("Asha", "9876543210").unwrap();

        let found = db.get_patient(patient.id).unwrap().unwrap();
        assert_eq!(found, patient);
        assert!(db.get_patient(patient.id + 1).unwrap().is_none());
    }
}
