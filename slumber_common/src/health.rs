//! # Health Record
//!
//! Point-in-time health of the monitor, overwritten on every poll and on
//! every caught failure. Only the latest outcome is kept.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Health state published by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// The last poll succeeded.
    Healthy,
    /// The last poll, or the loop itself, failed.
    Failed,
}

/// Most recent health outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    /// Outcome.
    pub status: HealthState,
    /// Error message; empty when healthy.
    pub message: String,
    /// Whole seconds since the Unix epoch.
    pub timestamp: u64,
}

impl HealthRecord {
    /// Healthy record stamped now.
    pub fn healthy() -> Self {
        Self {
            status: HealthState::Healthy,
            message: String::new(),
            timestamp: unix_timestamp_secs(),
        }
    }

    /// Failed record stamped now.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: HealthState::Failed,
            message: message.into(),
            timestamp: unix_timestamp_secs(),
        }
    }

    /// Whether the record reports a healthy state.
    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }
}

/// Current time in whole seconds since the Unix epoch.
pub fn unix_timestamp_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
