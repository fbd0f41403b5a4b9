//! Prelude module for common re-exports.
//!
//! ```rust
//! use slumber_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig, SlumberConfig};

// ─── Device ─────────────────────────────────────────────────────────
pub use crate::device::{
    DeviceCommand, DeviceConnector, DeviceControl, DeviceError, DeviceHandle, DeviceSnapshot,
    GestureKind, Side, SideStatus, TapState,
};

// ─── Gestures, alarms, base ─────────────────────────────────────────
pub use crate::alarm::{AlarmBlob, AlarmError, AlarmRecord, AlarmStore};
pub use crate::base::{ActuatorError, BaseActuator, BasePreset, BaseStatus, PresetPosition};
pub use crate::gesture::{
    GestureBehavior, GestureSettings, SettingsError, SettingsStore, TemperatureChange,
};

// ─── Health ─────────────────────────────────────────────────────────
pub use crate::health::{HealthRecord, HealthState, unix_timestamp_secs};
