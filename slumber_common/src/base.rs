//! Bed-base presets, status and actuator interface.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use thiserror::Error;

/// Named base configuration cycled by the base gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BasePreset {
    /// Raised head and feet.
    Relax,
    /// Fully lowered rest position.
    #[default]
    Flat,
}

impl BasePreset {
    /// The other preset.
    pub fn toggled(self) -> Self {
        match self {
            BasePreset::Relax => BasePreset::Flat,
            BasePreset::Flat => BasePreset::Relax,
        }
    }
}

impl fmt::Display for BasePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasePreset::Relax => f.write_str("relax"),
            BasePreset::Flat => f.write_str("flat"),
        }
    }
}

/// Absolute base target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetPosition {
    /// Head section position.
    pub head: u16,
    /// Feet section position.
    pub feet: u16,
    /// Movement speed.
    pub feed_rate: u16,
}

impl PresetPosition {
    /// Rest position; the feed rate is chosen by the actuator.
    pub const FLAT: Self = Self {
        head: 0,
        feet: 0,
        feed_rate: 0,
    };
}

/// Base state held in the shared status record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseStatus {
    /// Last commanded head position.
    pub head: u16,
    /// Last commanded feet position.
    pub feet: u16,
    /// A movement is believed to be in progress.
    pub is_moving: bool,
    /// Last update, whole seconds since the Unix epoch.
    pub last_update: u64,
    /// A base has been commanded at least once.
    pub is_configured: bool,
}

/// Actuator errors.
#[derive(Debug, Clone, Error)]
pub enum ActuatorError {
    /// The controller refused the movement.
    #[error("Movement rejected: {0}")]
    Rejected(String),

    /// The controller could not be reached.
    #[error("Actuator unavailable: {0}")]
    Unavailable(String),
}

/// Bed-base movement controller.
pub trait BaseActuator: Send + Sync + 'static {
    /// Move to the flat rest position.
    fn go_to_rest(&self) -> impl Future<Output = Result<(), ActuatorError>> + Send;

    /// Move to an absolute position.
    fn set_position(
        &self,
        position: PresetPosition,
    ) -> impl Future<Output = Result<(), ActuatorError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_toggle_round_trip() {
        assert_eq!(BasePreset::Flat.toggled(), BasePreset::Relax);
        assert_eq!(BasePreset::Relax.toggled(), BasePreset::Flat);
        assert_eq!(BasePreset::Relax.toggled().toggled(), BasePreset::Relax);
    }

    #[test]
    fn test_base_status_json_field_names() {
        let status = BaseStatus {
            head: 10,
            feet: 1,
            is_moving: true,
            last_update: 42,
            is_configured: true,
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"isMoving\":true"));
        assert!(json.contains("\"isConfigured\":true"));
        assert!(json.contains("\"lastUpdate\":42"));
    }
}
