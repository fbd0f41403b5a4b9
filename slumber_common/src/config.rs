//! Configuration loading traits and types.
//!
//! All Slumber settings that are not gesture bindings live in one TOML
//! file. Every section has defaults, so an empty file is a valid
//! configuration.
//!
//! # Usage
//!
//! ```rust,no_run
//! use slumber_common::config::{ConfigError, ConfigLoader, SlumberConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = SlumberConfig::load(Path::new("slumber.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use crate::base::{BasePreset, PresetPosition};
use crate::consts::{
    DEFAULT_ALARM_BLOB_PATH, DEFAULT_SETTINGS_PATH, DEFAULT_SNOOZE_MINUTES, DEFAULT_STATUS_PATH,
    FAST_CADENCE_MS, GESTURELESS_COVER_VERSION, MAX_SNOOZE_MINUTES, MIN_SNOOZE_MINUTES,
    SERVICE_NAME, SLOW_CADENCE_MS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Common configuration fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "slumber-bedroom"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: SERVICE_NAME.to_string(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Poll cadence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Cadence for covers that report taps.
    pub fast_cadence_ms: u64,
    /// Cadence for covers without tap sensors.
    pub slow_cadence_ms: u64,
    /// Cover version that lacks tap sensors.
    pub gestureless_cover_version: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            fast_cadence_ms: FAST_CADENCE_MS,
            slow_cadence_ms: SLOW_CADENCE_MS,
            gestureless_cover_version: GESTURELESS_COVER_VERSION.to_string(),
        }
    }
}

impl MonitorConfig {
    /// Fast cadence as a `Duration`.
    pub fn fast_cadence(&self) -> Duration {
        Duration::from_millis(self.fast_cadence_ms)
    }

    /// Slow cadence as a `Duration`.
    pub fn slow_cadence(&self) -> Duration {
        Duration::from_millis(self.slow_cadence_ms)
    }
}

/// Alarm snooze settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnoozeConfig {
    /// Snooze length used by the alarm gesture.
    pub default_minutes: u32,
}

impl Default for SnoozeConfig {
    fn default() -> Self {
        Self {
            default_minutes: DEFAULT_SNOOZE_MINUTES,
        }
    }
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Persisted alarm blob.
    pub alarm_blob: PathBuf,
    /// Gesture settings JSON.
    pub settings: PathBuf,
    /// Published status record JSON.
    pub status: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            alarm_blob: PathBuf::from(DEFAULT_ALARM_BLOB_PATH),
            settings: PathBuf::from(DEFAULT_SETTINGS_PATH),
            status: PathBuf::from(DEFAULT_STATUS_PATH),
        }
    }
}

/// Base preset coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetConfig {
    /// Target of the relax preset.
    pub relax: PresetPosition,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            relax: PresetPosition {
                head: 10,
                feet: 1,
                feed_rate: 50,
            },
        }
    }
}

impl PresetConfig {
    /// Coordinates of `preset`.
    pub fn position(&self, preset: BasePreset) -> PresetPosition {
        match preset {
            BasePreset::Relax => self.relax,
            BasePreset::Flat => PresetPosition::FLAT,
        }
    }
}

/// Top-level Slumber configuration.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// service_name = "slumber"
///
/// [monitor]
/// fast_cadence_ms = 2000
/// slow_cadence_ms = 60000
///
/// [presets.relax]
/// head = 10
/// feet = 1
/// feed_rate = 50
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlumberConfig {
    /// Shared service settings.
    #[serde(default)]
    pub shared: SharedConfig,
    /// Poll cadence settings.
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Snooze settings.
    #[serde(default)]
    pub snooze: SnoozeConfig,
    /// File locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Base presets.
    #[serde(default)]
    pub presets: PresetConfig,
}

impl SlumberConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `service_name` is empty
    /// - a cadence is zero, or the slow cadence is shorter than the fast one
    /// - the default snooze is outside the accepted range
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.monitor.fast_cadence_ms == 0 || self.monitor.slow_cadence_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll cadences must be non-zero".to_string(),
            ));
        }
        if self.monitor.slow_cadence_ms < self.monitor.fast_cadence_ms {
            return Err(ConfigError::ValidationError(format!(
                "slow_cadence_ms ({}) is shorter than fast_cadence_ms ({})",
                self.monitor.slow_cadence_ms, self.monitor.fast_cadence_ms
            )));
        }
        if !(MIN_SNOOZE_MINUTES..=MAX_SNOOZE_MINUTES).contains(&self.snooze.default_minutes) {
            return Err(ConfigError::ValidationError(format!(
                "snooze.default_minutes must be within {MIN_SNOOZE_MINUTES}..={MAX_SNOOZE_MINUTES}"
            )));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert_eq!(LogLevel::Warn.as_filter(), "warn");
    }

    #[test]
    fn test_log_level_deserialization() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct TestWrapper {
            level: LogLevel,
        }

        assert_eq!(
            toml::from_str::<TestWrapper>("level = \"trace\"")
                .unwrap()
                .level,
            LogLevel::Trace
        );
        assert_eq!(
            toml::from_str::<TestWrapper>("level = \"error\"")
                .unwrap()
                .level,
            LogLevel::Error
        );
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = SlumberConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.monitor.fast_cadence(), Duration::from_millis(2_000));
        assert_eq!(config.monitor.slow_cadence(), Duration::from_millis(60_000));
        assert_eq!(config.monitor.gestureless_cover_version, "Pod 3");
        assert_eq!(config.snooze.default_minutes, 10);
    }

    #[test]
    fn test_shared_config_validation_empty_service_name() {
        let mut config = SlumberConfig::default();
        config.shared.service_name = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_cadence_validation() {
        let mut config = SlumberConfig::default();
        config.monitor.fast_cadence_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SlumberConfig::default();
        config.monitor.slow_cadence_ms = 1_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_snooze_validation() {
        let mut config = SlumberConfig::default();
        config.snooze.default_minutes = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_preset_positions() {
        let presets = PresetConfig::default();
        assert_eq!(presets.position(BasePreset::Flat), PresetPosition::FLAT);
        assert_eq!(presets.position(BasePreset::Relax).head, 10);
        assert_eq!(presets.position(BasePreset::Relax).feet, 1);
    }

    #[test]
    fn test_config_loader_file_not_found() {
        let result = SlumberConfig::load(Path::new("/nonexistent/path/slumber.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn test_config_loader_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid toml {{{{").unwrap();

        let result = SlumberConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_config_loader_success() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[shared]
log_level = "debug"
service_name = "bedroom"

[monitor]
fast_cadence_ms = 500

[paths]
alarm_blob = "/tmp/alarm.bin"

[presets.relax]
head = 30
feet = 12
feed_rate = 40
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = SlumberConfig::load(file.path()).unwrap();
        assert_eq!(config.shared.log_level, LogLevel::Debug);
        assert_eq!(config.shared.service_name, "bedroom");
        assert_eq!(config.monitor.fast_cadence_ms, 500);
        assert_eq!(config.monitor.slow_cadence_ms, 60_000);
        assert_eq!(config.paths.alarm_blob, PathBuf::from("/tmp/alarm.bin"));
        assert_eq!(config.paths.settings, PathBuf::from(DEFAULT_SETTINGS_PATH));
        assert_eq!(config.presets.relax.head, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = NamedTempFile::new().unwrap();
        let config = SlumberConfig::load(file.path()).unwrap();
        assert_eq!(config.shared.service_name, SERVICE_NAME);
        assert_eq!(config.shared.log_level, LogLevel::Info);
    }
}
