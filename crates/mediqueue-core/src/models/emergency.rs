//! Emergency alert models.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle of an SOS alert.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlertStatus {
    /// Raised, no doctor has responded yet
    Active,
    /// A doctor is responding
    Accepted,
    /// Handled
    Completed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Accepted => "accepted",
            AlertStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(AlertStatus::Active),
            "accepted" => Some(AlertStatus::Accepted),
            "completed" => Some(AlertStatus::Completed),
            _ => None,
        }
    }
}

/// Doctor response to an alert.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlertAction {
    Accept,
    Complete,
}

impl AlertAction {
    /// Status the alert moves to.
    pub fn target_status(&self) -> AlertStatus {
        match self {
            AlertAction::Accept => AlertStatus::Accepted,
            AlertAction::Complete => AlertStatus::Completed,
        }
    }
}

impl FromStr for AlertAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(AlertAction::Accept),
            "completed" => Ok(AlertAction::Complete),
            other => Err(format!("Unknown alert action: {}", other)),
        }
    }
}

/// An SOS alert raised by or for a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyAlert {
    /// Row ID
    pub id: i64,
    pub patient_name: String,
    pub patient_phone: String,
    /// Free-text description of the emergency
    pub symptoms: String,
    pub status: AlertStatus,
    /// Creation timestamp
    pub created_at: String,
}

/// Notification published to live dashboards when an alert is raised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyEvent {
    pub alert_id: i64,
    pub patient_name: String,
    pub symptoms: String,
    /// Clinic-local wall clock time, e.g. "03:45 PM"
    pub timestamp: String,
}
