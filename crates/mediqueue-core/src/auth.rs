//! Doctor authentication and sessions.
//!
//! Credentials are checked by an injected [`CredentialVerifier`]; a
//! successful login issues an opaque session token that doctor-only
//! operations must present.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Authentication errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Doctor login required")]
    Unauthorized,

    #[error("Session expired, log in again")]
    SessionExpired,

    #[error("Invalid credential configuration: {0}")]
    InvalidConfig(String),

    #[error("Session store lock poisoned")]
    LockPoisoned,
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Decides whether a username/password pair belongs to a doctor.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// SHA-256 hex digest of a password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Single shared doctor account, compared in constant time.
pub struct StaticCredentialVerifier {
    username: String,
    password_sha256: [u8; 32],
}

impl StaticCredentialVerifier {
    /// Build from a username and the hex SHA-256 digest of the password.
    pub fn new(username: &str, password_sha256_hex: &str) -> AuthResult<Self> {
        let bytes = hex::decode(password_sha256_hex.trim())
            .map_err(|e| AuthError::InvalidConfig(format!("password digest: {}", e)))?;
        let password_sha256: [u8; 32] = bytes.try_into().map_err(|_| {
            AuthError::InvalidConfig("password digest must be 32 bytes".into())
        })?;

        Ok(Self {
            username: username.to_string(),
            password_sha256,
        })
    }

    /// Build from a plain-text password.
    pub fn from_password(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password_sha256: Sha256::digest(password.as_bytes()).into(),
        }
    }
}

impl CredentialVerifier for StaticCredentialVerifier {
    fn verify(&self, username: &str, password: &str) -> bool {
        let candidate: [u8; 32] = Sha256::digest(password.as_bytes()).into();
        let user_ok = self.username.as_bytes().ct_eq(username.as_bytes());
        let password_ok = self.password_sha256[..].ct_eq(&candidate[..]);
        (user_ok & password_ok).into()
    }
}

/// A logged-in doctor.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// How long a doctor stays logged in: one clinic day.
pub const SESSION_TTL_HOURS: i64 = 12;

impl Session {
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at >= ttl
    }
}

/// Live doctor sessions keyed by token.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttl(Duration::hours(SESSION_TTL_HOURS))
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Issue a fresh token for `username`.
    pub fn issue(&self, username: &str) -> AuthResult<String> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let mut sessions = self.sessions.lock().map_err(|_| AuthError::LockPoisoned)?;
        sessions.insert(
            token.clone(),
            Session {
                username: username.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(token)
    }

    /// Session for `token`. Unknown tokens are `Unauthorized`; expired
    /// ones are dropped and reported as `SessionExpired`.
    pub fn require(&self, token: &str) -> AuthResult<Session> {
        let mut sessions = self.sessions.lock().map_err(|_| AuthError::LockPoisoned)?;
        let session = sessions.get(token).ok_or(AuthError::Unauthorized)?;
        if session.is_expired(self.ttl, Utc::now()) {
            tracing::info!(username = %session.username, "Doctor session expired");
            sessions.remove(token);
            return Err(AuthError::SessionExpired);
        }
        Ok(session.clone())
    }

    /// End a session. Returns false if the token was unknown.
    pub fn revoke(&self, token: &str) -> AuthResult<bool> {
        let mut sessions = self.sessions.lock().map_err(|_| AuthError::LockPoisoned)?;
        Ok(sessions.remove(token).is_some())
    }

    pub fn active_count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_DIGEST: &str = "794616efe7b88a157e1691ed28c89a2c247531e2e6283957f323775967c2c72d";

    #[test]
    fn test_hash_password() {
        assert_eq!(hash_password("mediqueue123"), DEFAULT_DIGEST);
    }

    #[test]
    fn test_static_verifier() {
        let verifier = StaticCredentialVerifier::new("doctor", DEFAULT_DIGEST).unwrap();
        assert!(verifier.verify("doctor", "mediqueue123"));
        assert!(!verifier.verify("doctor", "mediqueue124"));
        assert!(!verifier.verify("Doctor", "mediqueue123"));
        assert!(!verifier.verify("", ""));
    }

    #[test]
    fn test_from_password_matches_digest() {
        let verifier = StaticCredentialVerifier::from_password("admin", "s3cret");
        assert!(verifier.verify("admin", "s3cret"));
        assert!(!verifier.verify("admin", "secret"));
    }

    #[test]
    fn test_bad_digest_config() {
        assert!(matches!(
            StaticCredentialVerifier::new("doctor", "not-hex"),
            Err(AuthError::InvalidConfig(_))
        ));
        assert!(matches!(
            StaticCredentialVerifier::new("doctor", "abcd"),
            Err(AuthError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_session_lifecycle() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.require("nope").unwrap_err(), AuthError::Unauthorized);

        let token = registry.issue("doctor").unwrap();
        assert_eq!(registry.require(&token).unwrap().username, "doctor");
        assert_eq!(registry.active_count(), 1);

        assert!(registry.revoke(&token).unwrap());
        assert!(!registry.revoke(&token).unwrap());
        assert_eq!(registry.require(&token).unwrap_err(), AuthError::Unauthorized);
    }

    #[test]
    fn test_sessions_expire() {
        let registry = SessionRegistry::new();
        let fresh = registry.issue("doctor").unwrap();
        registry.sessions.lock().unwrap().insert(
            "stale".into(),
            Session {
                username: "doctor".into(),
                created_at: Utc::now() - Duration::hours(SESSION_TTL_HOURS + 1),
            },
        );

        assert!(registry.require(&fresh).is_ok());
        assert_eq!(registry.require("stale").unwrap_err(), AuthError::SessionExpired);
        // Dropped on first expired use
        assert_eq!(registry.require("stale").unwrap_err(), AuthError::Unauthorized);
        assert_eq!(registry.active_count(), 1);

        let instant = SessionRegistry::with_ttl(Duration::zero());
        let token = instant.issue("doctor").unwrap();
        assert_eq!(instant.require(&token).unwrap_err(), AuthError::SessionExpired);
    }

    #[test]
    fn test_tokens_are_unique() {
        let registry = SessionRegistry::new();
        let a = registry.issue("doctor").unwrap();
        let b = registry.issue("doctor").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }
}
