//! Database layer for MediQueue.

mod alerts;
mod appointments;
mod doctors;
mod patients;
mod prescriptions;
mod schema;

pub use appointments::*;
pub use schema::*;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use thiserror::Error;

/// How long a writer waits for another connection's lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid stored value: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Clinic database. Opening it applies the schema and seeds the doctor
/// directory on first use.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Throwaway database, mostly for tests.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> DbResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;

        let db = Self { conn };
        let seeded = db.seed_doctors_if_empty()?;
        if seeded > 0 {
            tracing::info!(doctors = seeded, "Seeded doctor directory");
        }
        Ok(db)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn transaction(&mut self) -> DbResult<rusqlite::Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}

/// Current time as stored in `created_at` columns.
pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_keys_enforced() {
        let db = Database::open_in_memory().unwrap();
        let orphan = db.conn().execute(
            "INSERT INTO prescriptions (appointment_id, medicines, created_at) VALUES (99, 'x', 'now')",
            [],
        );
        assert!(orphan.is_err());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        for table in ["doctors", "patients", "appointments", "emergency_alerts", "prescriptions"] {
            assert!(tables.contains(&table.to_string()), "missing table {}", table);
        }
    }

    #[test]
    fn test_reopen_does_not_reseed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic.db");

        let first = Database::open(&path).unwrap();
        assert_eq!(first.list_doctors().unwrap().len(), 20);
        drop(first);

        let second = Database::open(&path).unwrap();
        assert_eq!(second.list_doctors().unwrap().len(), 20);
    }
}
