//! Payment-proof uploads.
//!
//! Proofs are validated (extension, size) before anything is written, then
//! stored in the upload directory as `<uuid-hex>_<sanitised name>`. Every
//! path goes through a `PathBoundary`, so neither `..` nor a symlink can
//! reach outside the upload directory.

use std::path::Path;

use strict_path::{PathBoundary, StrictPath, StrictPathError};
use thiserror::Error;

/// Payment proof errors.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Payment proof is required")]
    Missing,

    #[error("File type not allowed: {0}")]
    DisallowedExtension(String),

    #[error("Payment proof is {size} bytes; the limit is {max}")]
    TooLarge { size: u64, max: u64 },

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("Path outside the upload directory: {0}")]
    OutsideUploadDir(String),

    #[error("Payment proof not found: {0}")]
    NotFound(String),

    #[error("Upload directory error: {0}")]
    Boundary(#[from] StrictPathError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PaymentResult<T> = Result<T, PaymentError>;

/// Marker for paths inside the payment-proof upload directory.
#[derive(Clone)]
pub struct PaymentProofs;

/// Reduce an uploaded file name to a safe ASCII name.
///
/// Path separators and whitespace become underscores, anything outside
/// `[A-Za-z0-9_.-]` is dropped and leading dots or underscores are trimmed.
/// May return an empty string.
pub fn sanitize_file_name(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Lower-cased extension after the last dot, if any.
fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

/// Validated storage for payment proofs.
#[derive(Debug, Clone)]
pub struct PaymentStore {
    boundary: PathBoundary<PaymentProofs>,
    max_bytes: u64,
    allowed_extensions: Vec<String>,
}

impl PaymentStore {
    /// Open the upload directory, creating it if missing.
    pub fn new(
        dir: impl AsRef<Path>,
        max_bytes: u64,
        allowed_extensions: &[String],
    ) -> PaymentResult<Self> {
        let boundary = PathBoundary::try_new_create(dir)?;
        Ok(Self {
            boundary,
            max_bytes,
            allowed_extensions: allowed_extensions.iter().map(|e| e.to_lowercase()).collect(),
        })
    }

    pub fn dir(&self) -> &Path {
        self.boundary.as_ref()
    }

    /// Check an upload without touching the filesystem.
    pub fn validate(&self, file_name: &str, size: u64) -> PaymentResult<()> {
        if file_name.trim().is_empty() {
            return Err(PaymentError::Missing);
        }

        let ext = extension(file_name).unwrap_or_default();
        if !self.allowed_extensions.iter().any(|allowed| *allowed == ext) {
            return Err(PaymentError::DisallowedExtension(file_name.to_string()));
        }

        if size > self.max_bytes {
            return Err(PaymentError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }

        if sanitize_file_name(file_name).is_empty() {
            return Err(PaymentError::InvalidFileName(file_name.to_string()));
        }
        Ok(())
    }

    /// Validate and write a proof. Returns the stored file name.
    pub fn store(&self, file_name: &str, bytes: &[u8]) -> PaymentResult<String> {
        self.validate(file_name, bytes.len() as u64)?;

        let stored = format!(
            "{}_{}",
            uuid::Uuid::new_v4().simple(),
            sanitize_file_name(file_name)
        );
        let path = self.resolve(&stored)?;
        path.write(bytes)?;

        tracing::debug!(file = %path.strictpath_display(), bytes = bytes.len(), "Stored payment proof");
        Ok(stored)
    }

    /// Read a stored proof from inside the upload dir.
    pub fn read(&self, stored_name: &str) -> PaymentResult<Vec<u8>> {
        let path = self.resolve(stored_name)?;
        if !path.is_file() {
            return Err(PaymentError::NotFound(stored_name.to_string()));
        }
        Ok(path.read()?)
    }

    /// Delete a stored proof; a missing file is not an error.
    pub fn remove(&self, stored_name: &str) -> PaymentResult<()> {
        let path = self.resolve(stored_name)?;
        match path.remove_file() {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn resolve(&self, stored_name: &str) -> PaymentResult<StrictPath<PaymentProofs>> {
        if stored_name.is_empty() {
            return Err(PaymentError::InvalidFileName(stored_name.to_string()));
        }
        match self.boundary.strict_join(stored_name) {
            Ok(path) => Ok(path),
            Err(StrictPathError::PathEscapesBoundary { .. }) => {
                tracing::warn!(file = stored_name, "Rejected path outside upload directory");
                Err(PaymentError::OutsideUploadDir(stored_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
