//! Gesture behaviour settings.
//!
//! Settings map each `(side, gesture)` pair to one [`GestureBehavior`].
//! They are owned by the settings store and only read by the monitor.

use crate::device::{GestureKind, Side};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use thiserror::Error;

/// Direction of a relative temperature adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureChange {
    /// Raise the target.
    Increment,
    /// Lower the target.
    Decrement,
}

impl TemperatureChange {
    /// Apply the change of `amount` degrees to `current`.
    pub fn apply(self, current: i32, amount: i32) -> i32 {
        match self {
            TemperatureChange::Increment => current.saturating_add(amount),
            TemperatureChange::Decrement => current.saturating_sub(amount),
        }
    }
}

/// Action bound to a gesture.
///
/// # JSON Example
///
/// ```json
/// { "type": "temperature", "change": "increment", "amount": 2 }
/// { "type": "alarm" }
/// { "type": "base" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GestureBehavior {
    /// Shift the side's target temperature.
    Temperature {
        /// Direction of the shift.
        change: TemperatureChange,
        /// Degrees per gesture.
        amount: i32,
    },
    /// Snooze a vibrating alarm.
    Alarm,
    /// Cycle the bed base between presets.
    Base,
}

/// Gesture bindings of one side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideGestures {
    /// Behaviour per tap pattern.
    #[serde(default)]
    pub taps: BTreeMap<GestureKind, GestureBehavior>,
}

/// Gesture bindings of both sides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureSettings {
    /// Left side bindings.
    #[serde(default)]
    pub left: SideGestures,
    /// Right side bindings.
    #[serde(default)]
    pub right: SideGestures,
}

impl GestureSettings {
    /// Parse settings from JSON.
    pub fn from_json(content: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(content).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Configured behaviour for a gesture, if any.
    pub fn behavior(&self, side: Side, gesture: GestureKind) -> Option<&GestureBehavior> {
        self.side(side).taps.get(&gesture)
    }

    /// Bind a behaviour to a gesture.
    pub fn bind(&mut self, side: Side, gesture: GestureKind, behavior: GestureBehavior) {
        let gestures = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        gestures.taps.insert(gesture, behavior);
    }

    fn side(&self, side: Side) -> &SideGestures {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// Settings store errors.
#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    /// The settings source could not be read.
    #[error("Failed to read settings: {0}")]
    Read(String),

    /// The settings content is malformed.
    #[error("Failed to parse settings: {0}")]
    Parse(String),
}

/// Refreshable read-only source of gesture settings.
pub trait SettingsStore: Send + Sync + 'static {
    /// Reload the settings and return the current bindings.
    fn refresh(&self) -> impl Future<Output = Result<GestureSettings, SettingsError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_change_apply() {
        assert_eq!(TemperatureChange::Increment.apply(70, 2), 72);
        assert_eq!(TemperatureChange::Decrement.apply(70, 2), 68);
    }

    #[test]
    fn test_behavior_deserialization() {
        let settings = GestureSettings::from_json(
            r#"{
                "left": { "taps": {
                    "doubleTap": { "type": "temperature", "change": "decrement", "amount": 1 },
                    "tripleTap": { "type": "alarm" }
                } },
                "right": { "taps": { "quadTap": { "type": "base" } } }
            }"#,
        )
        .unwrap();

        assert_eq!(
            settings.behavior(Side::Left, GestureKind::DoubleTap),
            Some(&GestureBehavior::Temperature {
                change: TemperatureChange::Decrement,
                amount: 1,
            })
        );
        assert_eq!(
            settings.behavior(Side::Left, GestureKind::TripleTap),
            Some(&GestureBehavior::Alarm)
        );
        assert_eq!(
            settings.behavior(Side::Right, GestureKind::QuadTap),
            Some(&GestureBehavior::Base)
        );
        assert_eq!(settings.behavior(Side::Right, GestureKind::DoubleTap), None);
    }

    #[test]
    fn test_unknown_behavior_type_is_rejected() {
        let result = GestureSettings::from_json(
            r#"{ "left": { "taps": { "doubleTap": { "type": "lights" } } } }"#,
        );
        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_missing_sides_default_to_empty() {
        let settings = GestureSettings::from_json("{}").unwrap();
        assert_eq!(settings, GestureSettings::default());
    }
}
