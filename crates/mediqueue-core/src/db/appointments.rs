//! Appointment and token queue operations.

use rusqlite::{params, Connection, OptionalExtension};

use super::patients::insert_patient_on;
use super::{now, Database, DbError, DbResult};
use crate::models::{Appointment, AppointmentStatus, Patient, QueueEntry};

/// Fields needed to book a patient into a doctor's queue.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_name: String,
    pub patient_phone: String,
    pub doctor_id: i64,
    pub symptoms: String,
    /// Stored payment proof file name
    pub payment_proof: Option<String>,
}

impl Database {
    /// Register the patient and queue the appointment in one transaction.
    ///
    /// The token is the doctor's current waiting count plus one.
    pub fn book_appointment(&mut self, new: &NewAppointment) -> DbResult<(Patient, Appointment)> {
        let tx = self.conn.transaction()?;

        let doctor_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM doctors WHERE id = ?)",
            [new.doctor_id],
            |row| row.get(0),
        )?;
        if !doctor_exists {
            return Err(DbError::NotFound(format!("Doctor {}", new.doctor_id)));
        }

        let patient = insert_patient_on(&tx, &new.patient_name, &new.patient_phone)?;
        let token_number = count_waiting_on(&tx, new.doctor_id)? + 1;
        let created_at = now();

        tx.execute(
            r#"
            INSERT INTO appointments (
                patient_id, doctor_id, token_number, symptoms,
                status, payment_proof, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                patient.id,
                new.doctor_id,
                token_number,
                new.symptoms,
                AppointmentStatus::Waiting.as_str(),
                new.payment_proof,
                created_at,
            ],
        )?;
        let appointment = Appointment {
            id: tx.last_insert_rowid(),
            patient_id: patient.id,
            doctor_id: new.doctor_id,
            token_number,
            symptoms: new.symptoms.clone(),
            status: AppointmentStatus::Waiting,
            payment_proof: new.payment_proof.clone(),
            created_at,
        };

        tx.commit()?;
        Ok((patient, appointment))
    }

    /// Number of waiting appointments for a doctor.
    pub fn count_waiting(&self, doctor_id: i64) -> DbResult<i64> {
        count_waiting_on(&self.conn, doctor_id)
    }

    /// Get an appointment by ID.
    pub fn get_appointment(&self, id: i64) -> DbResult<Option<Appointment>> {
        self.conn
            .query_row(
                r#"
                SELECT id, patient_id, doctor_id, token_number, symptoms,
                       status, payment_proof, created_at
                FROM appointments
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok(AppointmentRow {
                        id: row.get(0)?,
                        patient_id: row.get(1)?,
                        doctor_id: row.get(2)?,
                        token_number: row.get(3)?,
                        symptoms: row.get(4)?,
                        status: row.get(5)?,
                        payment_proof: row.get(6)?,
                        created_at: row.get(7)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Waiting appointments for one doctor, by token.
    pub fn waiting_for_doctor(&self, doctor_id: i64) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, doctor_id, token_number, symptoms,
                   status, payment_proof, created_at
            FROM appointments
            WHERE doctor_id = ? AND status = 'waiting'
            ORDER BY token_number, id
            "#,
        )?;

        let rows = stmt.query_map([doctor_id], |row| {
            Ok(AppointmentRow {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                doctor_id: row.get(2)?,
                token_number: row.get(3)?,
                symptoms: row.get(4)?,
                status: row.get(5)?,
                payment_proof: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?;

        let mut appointments = Vec::new();
        for row in rows {
            appointments.push(row?.try_into()?);
        }
        Ok(appointments)
    }

    /// Every waiting appointment joined with patient and doctor, ordered by
    /// doctor then token.
    pub fn waiting_queue(&self) -> DbResult<Vec<QueueEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT a.id, a.token_number, a.symptoms, a.payment_proof,
                   p.name, p.phone, d.id, d.name, d.specialty
            FROM appointments a
            JOIN patients p ON p.id = a.patient_id
            JOIN doctors d ON d.id = a.doctor_id
            WHERE a.status = 'waiting'
            ORDER BY d.id, a.token_number, a.id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(QueueRow {
                appointment_id: row.get(0)?,
                token_number: row.get(1)?,
                symptoms: row.get(2)?,
                payment_proof: row.get(3)?,
                patient_name: row.get(4)?,
                patient_phone: row.get(5)?,
                doctor_id: row.get(6)?,
                doctor_name: row.get(7)?,
                specialty: row.get(8)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.try_into()?);
        }
        Ok(entries)
    }

    /// Mark an appointment completed. Returns false for an unknown ID.
    pub fn complete_appointment(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE appointments SET status = ?1 WHERE id = ?2",
            params![AppointmentStatus::Completed.as_str(), id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Renumber every doctor's waiting appointments 1, 2, 3... by booking
    /// order. Returns the number of renumbered appointments.
    pub fn reset_tokens(&mut self) -> DbResult<usize> {
        let tx = self.conn.transaction()?;

        let waiting: Vec<(i64, i64)> = {
            let mut stmt = tx.prepare(
                "SELECT id, doctor_id FROM appointments WHERE status = 'waiting' ORDER BY doctor_id, id",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            let collected = rows.collect::<Result<Vec<_>, rusqlite::Error>>()?;
            collected
        };

        let mut current_doctor = None;
        let mut token = 0i64;
        for (id, doctor_id) in &waiting {
            if current_doctor != Some(*doctor_id) {
                current_doctor = Some(*doctor_id);
                token = 0;
            }
            token += 1;
            tx.execute(
                "UPDATE appointments SET token_number = ?1 WHERE id = ?2",
                params![token, id],
            )?;
        }

        tx.commit()?;
        Ok(waiting.len())
    }
}

fn count_waiting_on(conn: &Connection, doctor_id: i64) -> DbResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE doctor_id = ? AND status = 'waiting'",
        [doctor_id],
        |row| row.get(0),
    )?)
}

/// Intermediate row struct for database mapping.
struct AppointmentRow {
    id: i64,
    patient_id: i64,
    doctor_id: i64,
    token_number: i64,
    symptoms: String,
    status: String,
    payment_proof: Option<String>,
    created_at: String,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = DbError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let status = AppointmentStatus::parse(&row.status).ok_or_else(|| {
            DbError::Constraint(format!("Unknown appointment status: {}", row.status))
        })?;

        Ok(Appointment {
            id: row.id,
            patient_id: row.patient_id,
            doctor_id: row.doctor_id,
            token_number: row.token_number,
            symptoms: row.symptoms,
            status,
            payment_proof: row.payment_proof,
            created_at: row.created_at,
        })
    }
}

struct QueueRow {
    appointment_id: i64,
    token_number: i64,
    symptoms: String,
    payment_proof: Option<String>,
    patient_name: String,
    patient_phone: String,
    doctor_id: i64,
    doctor_name: String,
    specialty: String,
}

impl TryFrom<QueueRow> for QueueEntry {
    type Error = DbError;

    fn try_from(row: QueueRow) -> Result<Self, Self::Error> {
        let specialty = row
            .specialty
            .parse()
            .map_err(|e| DbError::Constraint(format!("Doctor {}: {}", row.doctor_id, e)))?;

        Ok(QueueEntry {
            appointment_id: row.appointment_id,
            token_number: row.token_number,
            symptoms: row.symptoms,
            payment_proof: row.payment_proof,
            patient_name: row.patient_name,
            patient_phone: row.patient_phone,
            doctor_id: row.doctor_id,
            doctor_name: row.doctor_name,
            specialty,
        })
    }
}
