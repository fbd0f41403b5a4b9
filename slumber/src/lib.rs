//! # Slumber Library
//!
//! Runtime supervisor for a smart-bed controller.
//!
//! A single [`Monitor`] polls the bed device, detects tap gestures by
//! diffing consecutive status snapshots, and runs the behaviour the user
//! bound to each gesture: a relative temperature change, an alarm snooze,
//! or a bed-base preset toggle. Health is published after every poll.
//!
//! Device access, settings, persisted alarms and the base actuator are
//! traits defined in `slumber_common`; this crate holds the runtime and
//! the stock implementations of those traits.
//!
//! # Module Structure
//!
//! - [`monitor`] - Poll loop, cadence selection, health publishing
//! - [`gestures`] - Snapshot diffing
//! - [`dispatcher`] - Gesture behaviours and base movement tracking
//! - [`snooze`] - Alarm re-arming with fail-safe clear
//! - [`status`] - Shared health and base status record
//! - [`stores`] - File and in-memory settings/alarm stores
//! - [`drivers`] - Device driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        slumber (single crate)                    │
//! │  ┌──────────────┐    ┌──────────────┐    ┌────────────────────┐  │
//! │  │ SettingsStore│───►│   Monitor    │───►│   SharedStatus     │  │
//! │  └──────────────┘    │ (poll loop)  │    │ (health + base)    │  │
//! │                      └──────┬───────┘    └─────────▲──────────┘  │
//! │        DeviceConnector ◄────┤                      │             │
//! │                             ▼                      │             │
//! │                   ┌───────────────────┐            │             │
//! │                   │ GestureDispatcher │────────────┘             │
//! │                   └──┬──────┬──────┬──┘                          │
//! │                      ▼      ▼      ▼                             │
//! │           DeviceControl  Snoozer  BaseActuator                   │
//! │                             │                                    │
//! │                             ▼                                    │
//! │                         AlarmStore                               │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod dispatcher;
pub mod drivers;
pub mod gestures;
pub mod monitor;
pub mod snooze;
pub mod status;
pub mod stores;

// Re-export key types for convenience
pub use crate::dispatcher::{DispatchError, GestureDispatcher, estimate_movement_ms};
pub use crate::gestures::{GestureError, detect_gestures};
pub use crate::monitor::{Monitor, MonitorError, PollOutcome};
pub use crate::snooze::{AlarmSnoozer, SnoozeError, SnoozeOutcome, clamp_snooze_minutes};
pub use crate::status::{SharedStatus, StatusError, StatusRecord};
pub use crate::stores::{FileAlarmStore, JsonSettingsStore, MemoryAlarmStore, MemorySettingsStore};
