//! MediQueue Core Library
//!
//! Clinic queue management with a symptom → specialty recommender.
//!
//! # Architecture
//!
//! ```text
//! Symptoms ──► Recommender ──► Specialty ──► Doctor directory
//!                  │
//!        ┌─────────┴──────────┐
//!        │ Classifier (ONNX)  │  confidence ≥ 0.5 ?
//!        │  else Keyword table│──► always a known label
//!        └────────────────────┘
//!
//! Booking + payment proof ──► Token queue (per doctor) ──► Doctor dashboard
//!                                                              ▲
//! SOS ──► Emergency alert ──► AlertBus ────────────────────────┘
//! ```
//!
//! # Core Principle
//!
//! **The recommender never fails.** Model trouble of any kind degrades to
//! the deterministic keyword table.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Specialty, Appointment, EmergencyAlert, etc.)
//! - [`recommender`]: Keyword matcher, preprocessing, classifier adapter
//! - [`db`]: SQLite database layer
//! - [`clinic`]: Service facade for patient and doctor operations
//! - [`auth`]: Credential verification and doctor sessions
//! - [`alerts`]: Emergency alert publish/subscribe
//! - [`payments`]: Payment proof validation and storage
//! - [`export`]: Queue and prescription export
//! - [`config`]: Clinic configuration
//! - [`telemetry`]: Tracing setup

pub mod alerts;
pub mod auth;
pub mod clinic;
pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod payments;
pub mod recommender;
pub mod telemetry;

// Re-export commonly used types
pub use clinic::{Booking, BookingRequest, Clinic, ClinicError};
pub use config::ClinicConfig;
pub use db::Database;
pub use models::{
    Appointment, Doctor, EmergencyAlert, EmergencyEvent, Prescription, QueueEntry,
    QueueSnapshot, RecommendationResult, RecommendationSource, ScoredLabel, Specialty,
};
pub use recommender::{clean_medical_text, critical_symptom_warning, KeywordMatcher, Recommender};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::PathBuf;
use std::sync::Arc;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MediQueueError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Payment proof rejected: {0}")]
    PaymentError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<ClinicError> for MediQueueError {
    fn from(e: ClinicError) -> Self {
        match e {
            ClinicError::Database(e) => e.into(),
            ClinicError::Auth(e) => e.into(),
            ClinicError::Payment(e) => e.into(),
            ClinicError::Config(e) => e.into(),
            ClinicError::NotFound(what) => MediQueueError::NotFound(what),
            ClinicError::InvalidInput(what) => MediQueueError::InvalidInput(what),
            ClinicError::LockPoisoned => {
                MediQueueError::DatabaseError("database lock poisoned".into())
            }
        }
    }
}

impl From<db::DbError> for MediQueueError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => MediQueueError::NotFound(what),
            db::DbError::Json(e) => MediQueueError::SerializationError(e.to_string()),
            other => MediQueueError::DatabaseError(other.to_string()),
        }
    }
}

impl From<auth::AuthError> for MediQueueError {
    fn from(e: auth::AuthError) -> Self {
        match e {
            auth::AuthError::InvalidConfig(_) => MediQueueError::ConfigError(e.to_string()),
            auth::AuthError::InvalidCredentials => MediQueueError::InvalidCredentials,
            _ => MediQueueError::Unauthorized(e.to_string()),
        }
    }
}

impl From<payments::PaymentError> for MediQueueError {
    fn from(e: payments::PaymentError) -> Self {
        match e {
            payments::PaymentError::NotFound(what) => MediQueueError::NotFound(what),
            other => MediQueueError::PaymentError(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for MediQueueError {
    fn from(e: config::ConfigError) -> Self {
        MediQueueError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for MediQueueError {
    fn from(e: serde_json::Error) -> Self {
        MediQueueError::SerializationError(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Install the tracing subscriber. Returns false if one was already set.
#[uniffi::export]
pub fn init_logging(filter: String) -> bool {
    telemetry::init_tracing(&filter)
}

/// Open the clinic described by a JSON config file (or defaults), with
/// `MEDIQUEUE_*` environment overrides applied. Installs tracing with the
/// configured filter unless a subscriber is already set.
#[uniffi::export]
pub fn open_clinic(config_path: Option<String>) -> Result<Arc<MediQueue>, MediQueueError> {
    let mut config = match config_path {
        Some(path) => ClinicConfig::load(&PathBuf::from(path))?,
        None => ClinicConfig::default(),
    };
    config.apply_env_overrides();
    telemetry::init_tracing(&config.log_filter);

    let clinic = Clinic::open(&config)?;
    tracing::info!(database = %config.database_path.display(), "Clinic opened");
    Ok(Arc::new(MediQueue { clinic }))
}

/// Create a clinic on an in-memory database (for testing).
#[uniffi::export]
pub fn open_clinic_in_memory() -> Result<Arc<MediQueue>, MediQueueError> {
    let config = ClinicConfig {
        upload_dir: std::env::temp_dir().join("mediqueue-payments"),
        ..ClinicConfig::default()
    };
    let clinic = Clinic::new(Database::open_in_memory()?, &config)?;
    Ok(Arc::new(MediQueue { clinic }))
}

// =========================================================================
// Callback Interface
// =========================================================================

/// Host-side receiver for emergency alerts (e.g. a dashboard socket).
#[uniffi::export(callback_interface)]
pub trait AlertListener: Send + Sync {
    fn on_emergency(&self, event: FfiEmergencyEvent);
}

struct ListenerBridge(Box<dyn AlertListener>);

impl alerts::AlertSubscriber for ListenerBridge {
    fn on_emergency(&self, event: &EmergencyEvent) {
        self.0.on_emergency(event.clone().into());
    }
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe clinic handle for FFI.
#[derive(uniffi::Object)]
pub struct MediQueue {
    clinic: Clinic,
}

#[uniffi::export]
impl MediQueue {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Recommend a specialty for free-text symptoms. Never fails.
    pub fn recommend(&self, symptoms: String) -> FfiRecommendation {
        let result = self.clinic.recommend(&symptoms);
        FfiRecommendation {
            critical_warning: critical_symptom_warning(&symptoms),
            ..result.into()
        }
    }

    /// Every doctor in the directory.
    pub fn list_doctors(&self) -> Result<Vec<FfiDoctor>, MediQueueError> {
        let doctors = self.clinic.list_doctors()?;
        Ok(doctors.into_iter().map(|d| d.into()).collect())
    }

    /// Doctors for a specialty label as displayed (emergency marker allowed).
    pub fn doctors_for_specialty(&self, label: String) -> Result<Vec<FfiDoctor>, MediQueueError> {
        let doctors = self.clinic.doctors_for_label(&label)?;
        Ok(doctors.into_iter().map(|d| d.into()).collect())
    }

    /// Book an appointment with payment proof.
    pub fn book_appointment(
        &self,
        patient_name: String,
        patient_phone: String,
        doctor_id: i64,
        symptoms: String,
        proof_file_name: String,
        proof_bytes: Vec<u8>,
    ) -> Result<FfiBooking, MediQueueError> {
        let booking = self.clinic.book_appointment(BookingRequest {
            patient_name,
            patient_phone,
            doctor_id,
            symptoms,
            proof_file_name,
            proof_bytes,
        })?;
        Ok(booking.into())
    }

    /// Raise an SOS alert.
    pub fn trigger_emergency(
        &self,
        patient_name: String,
        patient_phone: String,
        symptoms: String,
    ) -> Result<FfiEmergencyAlert, MediQueueError> {
        let alert = self
            .clinic
            .trigger_emergency(&patient_name, &patient_phone, &symptoms)?;
        Ok(alert.into())
    }

    /// Receive every emergency alert raised from now on.
    pub fn add_alert_listener(&self, listener: Box<dyn AlertListener>) {
        self.clinic.subscribe_alerts(Arc::new(ListenerBridge(listener)));
    }

    // =========================================================================
    // Doctor Operations
    // =========================================================================

    /// Log in; returns the session token.
    pub fn login(&self, username: String, password: String) -> Result<String, MediQueueError> {
        Ok(self.clinic.login(&username, &password)?)
    }

    pub fn logout(&self, token: String) -> Result<(), MediQueueError> {
        Ok(self.clinic.logout(&token)?)
    }

    /// Waiting queue and active alerts.
    pub fn queue_snapshot(&self, token: String) -> Result<FfiQueueSnapshot, MediQueueError> {
        Ok(self.clinic.queue_snapshot(&token)?.into())
    }

    pub fn complete_appointment(
        &self,
        token: String,
        appointment_id: i64,
    ) -> Result<bool, MediQueueError> {
        Ok(self.clinic.complete_appointment(&token, appointment_id)?)
    }

    /// Renumber all waiting queues; returns the number of appointments touched.
    pub fn reset_tokens(&self, token: String) -> Result<u64, MediQueueError> {
        Ok(self.clinic.reset_tokens(&token)? as u64)
    }

    /// `action` is "accepted" or "completed".
    pub fn handle_emergency(
        &self,
        token: String,
        alert_id: i64,
        action: String,
    ) -> Result<bool, MediQueueError> {
        Ok(self.clinic.handle_emergency(&token, alert_id, &action)?)
    }

    pub fn save_prescription(
        &self,
        token: String,
        appointment_id: i64,
        medicines: String,
        instructions: Option<String>,
    ) -> Result<FfiPrescription, MediQueueError> {
        let prescription = self.clinic.save_prescription(
            &token,
            appointment_id,
            &medicines,
            instructions.as_deref(),
        )?;
        Ok(prescription.into())
    }

    pub fn get_prescription(
        &self,
        token: String,
        appointment_id: i64,
    ) -> Result<Option<FfiPrescription>, MediQueueError> {
        let prescription = self.clinic.get_prescription(&token, appointment_id)?;
        Ok(prescription.map(|p| p.into()))
    }

    /// Plain-text prescription slip for printing.
    pub fn prescription_slip(
        &self,
        token: String,
        appointment_id: i64,
    ) -> Result<String, MediQueueError> {
        Ok(self.clinic.prescription_slip(&token, appointment_id)?.render())
    }

    pub fn read_payment_proof(
        &self,
        token: String,
        appointment_id: i64,
    ) -> Result<Vec<u8>, MediQueueError> {
        Ok(self.clinic.read_payment_proof(&token, appointment_id)?)
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Export the waiting queue as CSV.
    pub fn export_queue_csv(&self, token: String) -> Result<String, MediQueueError> {
        Ok(self.clinic.export_queue_csv(&token)?)
    }

    /// Export the queue snapshot as JSON.
    pub fn export_queue_json(&self, token: String) -> Result<String, MediQueueError> {
        Ok(self.clinic.export_queue_json(&token)?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe ranked label.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiScoredLabel {
    pub label: String,
    pub confidence: f64,
}

impl From<ScoredLabel> for FfiScoredLabel {
    fn from(scored: ScoredLabel) -> Self {
        Self {
            label: scored.label.to_string(),
            confidence: scored.confidence,
        }
    }
}

/// FFI-safe recommendation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRecommendation {
    pub label: String,
    /// Label with the emergency marker when flagged
    pub display_label: String,
    pub confidence: Option<f64>,
    pub emergency: bool,
    /// "model" or "fallback"
    pub source: String,
    pub alternatives: Vec<FfiScoredLabel>,
    /// Symptoms mention a critical warning sign
    pub critical_warning: bool,
}

impl From<RecommendationResult> for FfiRecommendation {
    fn from(result: RecommendationResult) -> Self {
        Self {
            label: result.label.to_string(),
            display_label: result.display_label(),
            confidence: result.confidence,
            emergency: result.emergency,
            source: match result.source {
                RecommendationSource::Model => "model".into(),
                RecommendationSource::Fallback => "fallback".into(),
            },
            alternatives: result.alternatives.into_iter().map(|s| s.into()).collect(),
            critical_warning: false,
        }
    }
}

/// FFI-safe doctor.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoctor {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub specialty: String,
}

impl From<Doctor> for FfiDoctor {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            display_name: doctor.display_name(),
            name: doctor.name,
            specialty: doctor.specialty.to_string(),
        }
    }
}

/// FFI-safe booking confirmation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBooking {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub token_number: i64,
    pub doctor: FfiDoctor,
    pub payment_proof: String,
}

impl From<Booking> for FfiBooking {
    fn from(booking: Booking) -> Self {
        Self {
            appointment_id: booking.appointment_id,
            patient_id: booking.patient_id,
            token_number: booking.token_number,
            doctor: booking.doctor.into(),
            payment_proof: booking.payment_proof,
        }
    }
}

/// FFI-safe queue entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiQueueEntry {
    pub appointment_id: i64,
    pub token_number: i64,
    pub symptoms: String,
    pub payment_proof: Option<String>,
    pub patient_name: String,
    pub patient_phone: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub specialty: String,
}

impl From<QueueEntry> for FfiQueueEntry {
    fn from(entry: QueueEntry) -> Self {
        Self {
            appointment_id: entry.appointment_id,
            token_number: entry.token_number,
            symptoms: entry.symptoms,
            payment_proof: entry.payment_proof,
            patient_name: entry.patient_name,
            patient_phone: entry.patient_phone,
            doctor_id: entry.doctor_id,
            doctor_name: entry.doctor_name,
            specialty: entry.specialty.to_string(),
        }
    }
}

/// FFI-safe emergency alert.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEmergencyAlert {
    pub id: i64,
    pub patient_name: String,
    pub patient_phone: String,
    pub symptoms: String,
    pub status: String,
    pub created_at: String,
}

impl From<EmergencyAlert> for FfiEmergencyAlert {
    fn from(alert: EmergencyAlert) -> Self {
        Self {
            id: alert.id,
            patient_name: alert.patient_name,
            patient_phone: alert.patient_phone,
            symptoms: alert.symptoms,
            status: alert.status.as_str().to_string(),
            created_at: alert.created_at,
        }
    }
}

/// FFI-safe live alert notification.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEmergencyEvent {
    pub alert_id: i64,
    pub patient_name: String,
    pub symptoms: String,
    pub timestamp: String,
}

impl From<EmergencyEvent> for FfiEmergencyEvent {
    fn from(event: EmergencyEvent) -> Self {
        Self {
            alert_id: event.alert_id,
            patient_name: event.patient_name,
            symptoms: event.symptoms,
            timestamp: event.timestamp,
        }
    }
}

/// FFI-safe doctor dashboard.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiQueueSnapshot {
    pub entries: Vec<FfiQueueEntry>,
    pub alerts: Vec<FfiEmergencyAlert>,
}

impl From<QueueSnapshot> for FfiQueueSnapshot {
    fn from(snapshot: QueueSnapshot) -> Self {
        Self {
            entries: snapshot.entries.into_iter().map(|e| e.into()).collect(),
            alerts: snapshot.alerts.into_iter().map(|a| a.into()).collect(),
        }
    }
}

/// FFI-safe prescription.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPrescription {
    pub id: i64,
    pub appointment_id: i64,
    pub medicines: String,
    pub instructions: Option<String>,
    pub created_at: String,
}

impl From<Prescription> for FfiPrescription {
    fn from(prescription: Prescription) -> Self {
        Self {
            id: prescription.id,
            appointment_id: prescription.appointment_id,
            medicines: prescription.medicines,
            instructions: prescription.instructions,
            created_at: prescription.created_at,
        }
    }
}
