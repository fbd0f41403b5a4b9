//! Slumber Common Library
//!
//! Shared constants, configuration loading, device/alarm/base data types
//! and the boundary traits implemented by device drivers and stores.
//!
//! # Module Structure
//!
//! - [`consts`] - System-wide constants (cadences, snooze limits, paths)
//! - [`config`] - Configuration loading traits and types
//! - [`device`] - Device snapshots, commands and the connection traits
//! - [`gesture`] - Gesture behaviour settings and the settings store trait
//! - [`alarm`] - Persisted alarm records, blob codec and the alarm store trait
//! - [`base`] - Bed-base presets, base status and the actuator trait
//! - [`health`] - Health record published by the monitor
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! slumber_common = { path = "../slumber_common" }
//! ```
//!
//! ```rust
//! use slumber_common::prelude::*;
//! ```

pub mod alarm;
pub mod base;
pub mod config;
pub mod consts;
pub mod device;
pub mod gesture;
pub mod health;
pub mod prelude;
