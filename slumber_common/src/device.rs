//! Device snapshot types and connection traits.
//!
//! This module defines:
//! - `DeviceSnapshot` / `SideStatus` - Point-in-time device status per bed side
//! - `DeviceCommand` - Named commands accepted by the device command channel
//! - `DeviceConnector` / `DeviceHandle` - Connection provider interface
//! - `DeviceControl` - Command channel and partial temperature updates
//! - `DeviceError` - Connectivity error type

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use thiserror::Error;

/// One of the two independently controlled halves of the bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Left half.
    Left,
    /// Right half.
    Right,
}

impl Side {
    /// Both sides, in polling order.
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    /// Lowercase name used in logs and settings files.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tap patterns reported by the cover sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GestureKind {
    /// Two quick taps.
    DoubleTap,
    /// Three quick taps.
    TripleTap,
    /// Four quick taps.
    QuadTap,
}

impl GestureKind {
    /// Every gesture kind, in comparison order.
    pub const ALL: [GestureKind; 3] = [
        GestureKind::DoubleTap,
        GestureKind::TripleTap,
        GestureKind::QuadTap,
    ];
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GestureKind::DoubleTap => "doubleTap",
            GestureKind::TripleTap => "tripleTap",
            GestureKind::QuadTap => "quadTap",
        };
        f.write_str(name)
    }
}

/// Raw tap state as reported by the device.
///
/// Older firmware reports a flag, newer firmware a running counter. The
/// monitor only compares states for equality, so the meaning of the value
/// itself is opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TapState {
    /// Boolean tap indicator.
    Flag(bool),
    /// Monotonic tap counter.
    Count(u64),
}

/// Status of one bed side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideStatus {
    /// Target temperature in degrees Fahrenheit.
    pub target_temperature_f: i32,
    /// Whether the side's alarm is vibrating right now.
    pub is_alarm_vibrating: bool,
    /// Tap states; `None` when fetched without gesture fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taps: Option<BTreeMap<GestureKind, TapState>>,
}

impl SideStatus {
    /// Tap state for one gesture, if the device reported it.
    pub fn tap(&self, gesture: GestureKind) -> Option<&TapState> {
        self.taps.as_ref().and_then(|taps| taps.get(&gesture))
    }
}

/// Point-in-time status of the whole device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    /// Hardware version of the sensor cover.
    pub cover_version: String,
    /// Left side status.
    pub left: SideStatus,
    /// Right side status.
    pub right: SideStatus,
}

impl DeviceSnapshot {
    /// Status of the given side.
    pub fn side(&self, side: Side) -> &SideStatus {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Whether either side reports a vibrating alarm.
    pub fn any_alarm_vibrating(&self) -> bool {
        self.left.is_alarm_vibrating || self.right.is_alarm_vibrating
    }

    /// Whether the cover reports tap gestures at all.
    pub fn supports_gestures(&self, gestureless_cover_version: &str) -> bool {
        self.cover_version != gestureless_cover_version
    }
}

/// Commands accepted by the device command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCommand {
    /// Arm the left side alarm with an encoded record.
    AlarmLeft,
    /// Arm the right side alarm with an encoded record.
    AlarmRight,
    /// Stop any active alarm.
    AlarmClear,
}

impl DeviceCommand {
    /// Side-specific alarm-set command.
    pub fn set_alarm(side: Side) -> Self {
        match side {
            Side::Left => DeviceCommand::AlarmLeft,
            Side::Right => DeviceCommand::AlarmRight,
        }
    }

    /// Wire name of the command.
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceCommand::AlarmLeft => "ALARM_LEFT",
            DeviceCommand::AlarmRight => "ALARM_RIGHT",
            DeviceCommand::AlarmClear => "ALARM_CLEAR",
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connectivity errors.
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    /// Could not open a connection to the device.
    #[error("Device connection failed: {0}")]
    ConnectFailed(String),

    /// Connection dropped while a request was in flight.
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    /// The device answered but the status could not be read.
    #[error("Device status fetch failed: {0}")]
    SnapshotFailed(String),

    /// The device refused a command.
    #[error("Device rejected {command}: {reason}")]
    CommandRejected {
        /// Rejected command.
        command: DeviceCommand,
        /// Reason reported by the device.
        reason: String,
    },
}

/// Live connection to the device.
pub trait DeviceHandle: Send {
    /// Fetch a status snapshot.
    ///
    /// Tap fields are only requested when `include_gestures` is set; they are
    /// comparatively expensive and absent on covers without tap sensors.
    fn snapshot(
        &mut self,
        include_gestures: bool,
    ) -> impl Future<Output = Result<DeviceSnapshot, DeviceError>> + Send;
}

/// Connection provider.
///
/// Connections are not pooled: the monitor acquires a fresh handle on every
/// poll and drops it afterwards.
pub trait DeviceConnector: Send + Sync + 'static {
    /// Handle type returned by [`connect`](Self::connect).
    type Handle: DeviceHandle + 'static;

    /// Acquire a live device handle.
    fn connect(&self) -> impl Future<Output = Result<Self::Handle, DeviceError>> + Send;
}

/// Device command channel and status update sink.
pub trait DeviceControl: Send + Sync + 'static {
    /// Execute a named command with a hex-encoded payload.
    fn execute(
        &self,
        command: DeviceCommand,
        payload: &str,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;

    /// Update the target temperature of one side only.
    fn set_target_temperature(
        &self,
        side: Side,
        target_temperature_f: i32,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;
}
