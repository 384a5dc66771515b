//! Doctor directory operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Doctor, Specialty, SEED_DOCTORS};

impl Database {
    /// Insert the default directory when no doctor exists. Returns the number
    /// of doctors inserted.
    pub fn seed_doctors_if_empty(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM doctors", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(0);
        }

        for (name, specialty) in SEED_DOCTORS {
            self.insert_doctor(name, specialty)?;
        }
        Ok(SEED_DOCTORS.len())
    }

    /// Add a doctor to the directory.
    pub fn insert_doctor(&self, name: &str, specialty: Specialty) -> DbResult<Doctor> {
        self.conn.execute(
            "INSERT INTO doctors (name, specialty) VALUES (?1, ?2)",
            params![name, specialty.as_str()],
        )?;
        Ok(Doctor {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            specialty,
        })
    }

    /// Get a doctor by ID.
    pub fn get_doctor(&self, id: i64) -> DbResult<Option<Doctor>> {
        self.conn
            .query_row(
                "SELECT id, name, specialty FROM doctors WHERE id = ?",
                [id],
                |row| {
                    Ok(DoctorRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        specialty: row.get(2)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Every doctor, by ID.
    pub fn list_doctors(&self) -> DbResult<Vec<Doctor>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, specialty FROM doctors ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(DoctorRow {
                id: row.get(0)?,
                name: row.get(1)?,
                specialty: row.get(2)?,
            })
        })?;

        let mut doctors = Vec::new();
        for row in rows {
            doctors.push(row?.try_into()?);
        }
        Ok(doctors)
    }

    /// Doctors tagged with exactly this specialty.
    pub fn doctors_for_specialty(&self, specialty: Specialty) -> DbResult<Vec<Doctor>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, specialty FROM doctors WHERE specialty = ? ORDER BY id")?;
        let rows = stmt.query_map([specialty.as_str()], |row| {
            Ok(DoctorRow {
                id: row.get(0)?,
                name: row.get(1)?,
                specialty: row.get(2)?,
            })
        })?;

        let mut doctors = Vec::new();
        for row in rows {
            doctors.push(row?.try_into()?);
        }
        Ok(doctors)
    }
}

struct DoctorRow {
    id: i64,
    name: String,
    specialty: String,
}

impl TryFrom<DoctorRow> for Doctor {
    type Error = DbError;

    fn try_from(row: DoctorRow) -> Result<Self, Self::Error> {
        let specialty = row
            .specialty
            .parse()
            .map_err(|e| DbError::Constraint(format!("Doctor {}: {}", row.id, e)))?;
        Ok(Doctor {
            id: row.id,
            name: row.name,
            specialty,
        })
    }
}
