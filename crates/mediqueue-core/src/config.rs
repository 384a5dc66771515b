//! Clinic configuration.
//!
//! A JSON file where every field is optional, plus a few environment
//! overrides for deployment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// SHA-256 of the stock doctor password.
pub const DEFAULT_PASSWORD_SHA256: &str =
    "794616efe7b88a157e1691ed28c89a2c247531e2e6283957f323775967c2c72d";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Directory holding payment proofs
    pub upload_dir: PathBuf,
    /// Upload size limit in bytes
    pub max_upload_bytes: u64,
    /// Accepted payment proof extensions (case-insensitive)
    pub allowed_extensions: Vec<String>,
    /// Exported classifier directory; keyword fallback only when absent
    pub model_dir: Option<PathBuf>,
    pub doctor_username: String,
    /// Hex SHA-256 of the doctor password
    pub doctor_password_sha256: String,
    /// Clinic-local offset from UTC for alert timestamps
    pub utc_offset_minutes: i32,
    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("mediqueue.db"),
            upload_dir: PathBuf::from("static/payments"),
            max_upload_bytes: 5 * 1024 * 1024,
            allowed_extensions: ["png", "jpg", "jpeg", "gif", "pdf"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            model_dir: None,
            doctor_username: "doctor".into(),
            doctor_password_sha256: DEFAULT_PASSWORD_SHA256.into(),
            // IST
            utc_offset_minutes: 330,
            log_filter: "info".into(),
        }
    }
}

impl ClinicConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ClinicConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `MEDIQUEUE_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("MEDIQUEUE_DATABASE_PATH") {
            self.database_path = path.into();
        }
        if let Some(dir) = lookup("MEDIQUEUE_UPLOAD_DIR") {
            self.upload_dir = dir.into();
        }
        if let Some(dir) = lookup("MEDIQUEUE_MODEL_DIR") {
            self.model_dir = Some(dir.into());
        }
        if let Some(filter) = lookup("MEDIQUEUE_LOG") {
            self.log_filter = filter;
        }
    }

    /// Reject values that cannot work at runtime.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.allowed_extensions.is_empty() {
            return Err(ConfigError::Invalid("allowed_extensions is empty".into()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("max_upload_bytes must be positive".into()));
        }
        if !(-720..=840).contains(&self.utc_offset_minutes) {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }
}
