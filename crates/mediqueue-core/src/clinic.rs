//! Clinic service.
//!
//! Combines storage, the specialty recommender, doctor sessions, the
//! emergency alert bus and payment-proof storage behind one API. Patient
//! operations are public; doctor operations take a session token.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::alerts::{AlertBus, AlertSubscriber};
use crate::auth::{AuthError, CredentialVerifier, SessionRegistry, StaticCredentialVerifier};
use crate::config::{ClinicConfig, ConfigError};
use crate::db::{Database, DbError, NewAppointment};
use crate::export::{PrescriptionSlip, QueueExport};
use crate::models::{
    AlertAction, AlertStatus, Doctor, EmergencyAlert, EmergencyEvent, Prescription,
    QueueSnapshot, RecommendationResult, Specialty,
};
use crate::payments::{PaymentError, PaymentStore};
use crate::recommender::Recommender;

/// Clinic errors.
#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

pub type ClinicResult<T> = Result<T, ClinicError>;

/// A patient registration with payment proof.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub patient_name: String,
    pub patient_phone: String,
    pub doctor_id: i64,
    pub symptoms: String,
    /// File name as uploaded
    pub proof_file_name: String,
    pub proof_bytes: Vec<u8>,
}

/// Confirmation handed back to the patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub token_number: i64,
    pub doctor: Doctor,
    /// Stored payment proof file name
    pub payment_proof: String,
}

/// The clinic.
pub struct Clinic {
    db: Arc<Mutex<Database>>,
    recommender: Recommender,
    verifier: Box<dyn CredentialVerifier>,
    sessions: SessionRegistry,
    alerts: AlertBus,
    payments: PaymentStore,
    local_offset: FixedOffset,
}

impl Clinic {
    /// Open the configured database and build the service.
    pub fn open(config: &ClinicConfig) -> ClinicResult<Self> {
        let db = Database::open(&config.database_path)?;
        Self::new(db, config)
    }

    /// Build the service around an open database.
    pub fn new(db: Database, config: &ClinicConfig) -> ClinicResult<Self> {
        config.validate()?;

        let local_offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::Invalid(format!("utc_offset_minutes: {}", config.utc_offset_minutes))
        })?;
        let verifier =
            StaticCredentialVerifier::new(&config.doctor_username, &config.doctor_password_sha256)?;
        let recommender = match &config.model_dir {
            Some(dir) => Recommender::with_model_dir(dir.clone()),
            None => Recommender::keyword_only(),
        };

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            recommender,
            verifier: Box::new(verifier),
            sessions: SessionRegistry::new(),
            alerts: AlertBus::new(),
            payments: PaymentStore::new(
                &config.upload_dir,
                config.max_upload_bytes,
                &config.allowed_extensions,
            )?,
            local_offset,
        })
    }

    /// Replace the recommender.
    pub fn with_recommender(mut self, recommender: Recommender) -> Self {
        self.recommender = recommender;
        self
    }

    /// Replace the credential verifier.
    pub fn with_verifier(mut self, verifier: Box<dyn CredentialVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Shared handle to the database.
    pub fn database(&self) -> Arc<Mutex<Database>> {
        Arc::clone(&self.db)
    }

    fn db(&self) -> ClinicResult<MutexGuard<'_, Database>> {
        self.db.lock().map_err(|_| ClinicError::LockPoisoned)
    }

    fn require_doctor(&self, token: &str) -> ClinicResult<()> {
        self.sessions.require(token)?;
        Ok(())
    }

    // =========================================================================
    // Patient operations
    // =========================================================================

    /// Recommend a specialty for free-text symptoms.
    pub fn recommend(&self, symptoms: &str) -> RecommendationResult {
        self.recommender.recommend(symptoms)
    }

    pub fn recommender(&self) -> &Recommender {
        &self.recommender
    }

    pub fn list_doctors(&self) -> ClinicResult<Vec<Doctor>> {
        Ok(self.db()?.list_doctors()?)
    }

    pub fn doctors_for_specialty(&self, specialty: Specialty) -> ClinicResult<Vec<Doctor>> {
        Ok(self.db()?.doctors_for_specialty(specialty)?)
    }

    /// Doctors for a displayed label; the emergency marker is ignored.
    pub fn doctors_for_label(&self, label: &str) -> ClinicResult<Vec<Doctor>> {
        let specialty: Specialty = label
            .parse()
            .map_err(|e: crate::models::SpecialtyParseError| {
                ClinicError::InvalidInput(e.to_string())
            })?;
        self.doctors_for_specialty(specialty)
    }

    /// Register a patient and give them the next token in the doctor's queue.
    ///
    /// The payment proof is validated before anything is written.
    pub fn book_appointment(&self, request: BookingRequest) -> ClinicResult<Booking> {
        if request.patient_name.trim().is_empty() || request.patient_phone.trim().is_empty() {
            return Err(ClinicError::InvalidInput(
                "patient name and phone are required".into(),
            ));
        }
        self.payments
            .validate(&request.proof_file_name, request.proof_bytes.len() as u64)?;

        let mut db = self.db()?;
        let doctor = db
            .get_doctor(request.doctor_id)?
            .ok_or_else(|| ClinicError::NotFound(format!("Doctor {}", request.doctor_id)))?;

        let stored = self
            .payments
            .store(&request.proof_file_name, &request.proof_bytes)?;

        let booked = db.book_appointment(&NewAppointment {
            patient_name: request.patient_name.trim().to_string(),
            patient_phone: request.patient_phone.trim().to_string(),
            doctor_id: doctor.id,
            symptoms: request.symptoms,
            payment_proof: Some(stored.clone()),
        });

        let (patient, appointment) = match booked {
            Ok(rows) => rows,
            Err(e) => {
                if let Err(cleanup) = self.payments.remove(&stored) {
                    warn!(file = %stored, error = %cleanup, "Failed to remove orphaned payment proof");
                }
                return Err(e.into());
            }
        };

        info!(
            appointment_id = appointment.id,
            doctor = %doctor.display_name(),
            token = appointment.token_number,
            "Appointment booked"
        );

        Ok(Booking {
            appointment_id: appointment.id,
            patient_id: patient.id,
            token_number: appointment.token_number,
            doctor,
            payment_proof: stored,
        })
    }

    /// Raise an SOS alert and notify live dashboards. No login needed.
    pub fn trigger_emergency(
        &self,
        patient_name: &str,
        patient_phone: &str,
        symptoms: &str,
    ) -> ClinicResult<EmergencyAlert> {
        if patient_name.trim().is_empty() || symptoms.trim().is_empty() {
            return Err(ClinicError::InvalidInput(
                "patient name and symptoms are required".into(),
            ));
        }

        let alert = self
            .db()?
            .insert_alert(patient_name.trim(), patient_phone.trim(), symptoms.trim())?;

        let event = EmergencyEvent {
            alert_id: alert.id,
            patient_name: alert.patient_name.clone(),
            symptoms: alert.symptoms.clone(),
            timestamp: self.local_now("%I:%M %p"),
        };
        warn!(alert_id = alert.id, "Emergency alert raised");
        self.alerts.publish(&event);

        Ok(alert)
    }

    /// Register a live dashboard for emergency events.
    pub fn subscribe_alerts(&self, subscriber: Arc<dyn AlertSubscriber>) {
        self.alerts.subscribe(subscriber);
    }

    fn local_now(&self, format: &str) -> String {
        Utc::now()
            .with_timezone(&self.local_offset)
            .format(format)
            .to_string()
    }

    // =========================================================================
    // Doctor authentication
    // =========================================================================

    /// Check credentials and open a session. Returns the session token.
    pub fn login(&self, username: &str, password: &str) -> ClinicResult<String> {
        if !self.verifier.verify(username, password) {
            warn!("Rejected doctor login");
            return Err(AuthError::InvalidCredentials.into());
        }
        let token = self.sessions.issue(username)?;
        info!("Doctor logged in");
        Ok(token)
    }

    /// End a session. Unknown tokens are ignored.
    pub fn logout(&self, token: &str) -> ClinicResult<()> {
        self.sessions.revoke(token)?;
        Ok(())
    }

    // =========================================================================
    // Doctor operations
    // =========================================================================

    /// Waiting queue for every doctor plus active alerts.
    pub fn queue_snapshot(&self, token: &str) -> ClinicResult<QueueSnapshot> {
        self.require_doctor(token)?;
        let db = self.db()?;
        Ok(QueueSnapshot {
            entries: db.waiting_queue()?,
            alerts: db.list_alerts_by_status(AlertStatus::Active)?,
        })
    }

    /// Queue snapshot as CSV.
    pub fn export_queue_csv(&self, token: &str) -> ClinicResult<String> {
        Ok(QueueExport::new(self.queue_snapshot(token)?).to_csv())
    }

    /// Queue snapshot as JSON.
    pub fn export_queue_json(&self, token: &str) -> ClinicResult<String> {
        let json = QueueExport::new(self.queue_snapshot(token)?)
            .to_json()
            .map_err(DbError::from)?;
        Ok(json)
    }

    /// Mark an appointment seen. Returns false for an unknown ID.
    pub fn complete_appointment(&self, token: &str, appointment_id: i64) -> ClinicResult<bool> {
        self.require_doctor(token)?;
        let done = self.db()?.complete_appointment(appointment_id)?;
        if done {
            info!(appointment_id, "Appointment completed");
        }
        Ok(done)
    }

    /// Renumber every waiting queue from 1.
    pub fn reset_tokens(&self, token: &str) -> ClinicResult<usize> {
        self.require_doctor(token)?;
        let renumbered = self.db()?.reset_tokens()?;
        info!(renumbered, "Token queues reset");
        Ok(renumbered)
    }

    /// Accept or complete an alert. `action` is `accepted` or `completed`.
    ///
    /// Returns false for an unknown alert ID.
    pub fn handle_emergency(&self, token: &str, alert_id: i64, action: &str) -> ClinicResult<bool> {
        self.require_doctor(token)?;
        let action: AlertAction = action.parse().map_err(ClinicError::InvalidInput)?;
        let updated = self
            .db()?
            .set_alert_status(alert_id, action.target_status())?;
        if updated {
            info!(alert_id, status = action.target_status().as_str(), "Emergency alert updated");
        }
        Ok(updated)
    }

    /// Issue a prescription for an appointment.
    pub fn save_prescription(
        &self,
        token: &str,
        appointment_id: i64,
        medicines: &str,
        instructions: Option<&str>,
    ) -> ClinicResult<Prescription> {
        self.require_doctor(token)?;
        if medicines.trim().is_empty() {
            return Err(ClinicError::InvalidInput("medicines are required".into()));
        }
        let instructions = instructions.map(str::trim).filter(|i| !i.is_empty());

        let db = self.db()?;
        if db.get_appointment(appointment_id)?.is_none() {
            return Err(ClinicError::NotFound(format!("Appointment {}", appointment_id)));
        }
        Ok(db.insert_prescription(appointment_id, medicines, instructions)?)
    }

    /// First prescription issued for an appointment.
    pub fn get_prescription(
        &self,
        token: &str,
        appointment_id: i64,
    ) -> ClinicResult<Option<Prescription>> {
        self.require_doctor(token)?;
        Ok(self.db()?.first_prescription(appointment_id)?)
    }

    /// Printable slip for the first prescription of an appointment.
    pub fn prescription_slip(&self, token: &str, appointment_id: i64) -> ClinicResult<PrescriptionSlip> {
        self.require_doctor(token)?;
        let db = self.db()?;

        let not_found = |what: &str| ClinicError::NotFound(format!("{} for appointment {}", what, appointment_id));
        let appointment = db
            .get_appointment(appointment_id)?
            .ok_or_else(|| not_found("Appointment"))?;
        let prescription = db
            .first_prescription(appointment_id)?
            .ok_or_else(|| not_found("Prescription"))?;
        let patient = db
            .get_patient(appointment.patient_id)?
            .ok_or_else(|| not_found("Patient"))?;
        let doctor = db
            .get_doctor(appointment.doctor_id)?
            .ok_or_else(|| not_found("Doctor"))?;

        Ok(PrescriptionSlip {
            patient,
            doctor,
            appointment,
            prescription,
            issued_at: self.local_now("%d-%m-%Y %I:%M:%S %p"),
        })
    }

    /// Bytes of an appointment's payment proof.
    pub fn read_payment_proof(&self, token: &str, appointment_id: i64) -> ClinicResult<Vec<u8>> {
        self.require_doctor(token)?;
        let stored = self
            .db()?
            .get_appointment(appointment_id)?
            .and_then(|a| a.payment_proof)
            .ok_or_else(|| {
                ClinicError::NotFound(format!("Payment proof for appointment {}", appointment_id))
            })?;
        Ok(self.payments.read(&stored)?)
    }
}
