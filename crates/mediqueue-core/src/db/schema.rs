//! SQLite schema definition.

/// Complete database schema for MediQueue.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Doctor Directory
-- ============================================================================

CREATE TABLE IF NOT EXISTS doctors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    specialty TEXT NOT NULL                       -- Specialty display name
);

CREATE INDEX IF NOT EXISTS idx_doctors_specialty ON doctors(specialty);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    phone TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- ============================================================================
-- Appointments (per-doctor token queue)
-- ============================================================================

CREATE TABLE IF NOT EXISTS appointments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id INTEGER NOT NULL REFERENCES patients(id),
    doctor_id INTEGER NOT NULL REFERENCES doctors(id),
    token_number INTEGER NOT NULL,
    symptoms TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'waiting'
        CHECK (status IN ('waiting', 'completed')),
    payment_proof TEXT,                           -- Stored file name in the upload dir
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_appointments_queue
    ON appointments(doctor_id, status, token_number);

-- ============================================================================
-- Emergency Alerts
-- ============================================================================

CREATE TABLE IF NOT EXISTS emergency_alerts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_name TEXT NOT NULL,
    patient_phone TEXT NOT NULL,
    symptoms TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'active'
        CHECK (status IN ('active', 'accepted', 'completed')),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_alerts_status ON emergency_alerts(status, created_at);

-- ============================================================================
-- Prescriptions
-- ============================================================================

CREATE TABLE IF NOT EXISTS prescriptions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    appointment_id INTEGER NOT NULL REFERENCES appointments(id),
    medicines TEXT NOT NULL,
    instructions TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_prescriptions_appointment ON prescriptions(appointment_id);
"#;
