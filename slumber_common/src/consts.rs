//! System-wide constants for the Slumber workspace.
//!
//! Single source of truth for cadences, limits and default paths.

/// Canonical service name (used for logging and the status file).
pub const SERVICE_NAME: &str = "slumber";

/// Poll cadence for devices that report tap gestures (milliseconds).
pub const FAST_CADENCE_MS: u64 = 2_000;

/// Poll cadence for devices without gesture support (milliseconds).
pub const SLOW_CADENCE_MS: u64 = 60_000;

/// Cover hardware version that does not report tap gestures.
pub const GESTURELESS_COVER_VERSION: &str = "Pod 3";

/// Snooze length used by the alarm gesture and for out-of-range requests.
pub const DEFAULT_SNOOZE_MINUTES: u32 = 10;

/// Shortest accepted snooze.
pub const MIN_SNOOZE_MINUTES: u32 = 1;

/// Longest accepted snooze.
pub const MAX_SNOOZE_MINUTES: u32 = 10;

/// Estimated base travel time per position unit (milliseconds).
pub const MOVEMENT_MS_PER_UNIT: u64 = 200;

/// No base movement is assumed to finish faster than this (milliseconds).
pub const MIN_MOVEMENT_MS: u64 = 3_000;

/// Payload sent with the alarm-clear command.
pub const ALARM_CLEAR_PAYLOAD: &str = "empty";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/slumber/slumber.toml";

/// Default location of the persisted alarm blob.
pub const DEFAULT_ALARM_BLOB_PATH: &str = "/persistent/alarm.bin";

/// Default location of the gesture settings file.
pub const DEFAULT_SETTINGS_PATH: &str = "/persistent/slumber/settings.json";

/// Default location of the published status record.
pub const DEFAULT_STATUS_PATH: &str = "/persistent/slumber/status.json";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_consistent() {
        assert!(FAST_CADENCE_MS < SLOW_CADENCE_MS);
        assert!(MIN_SNOOZE_MINUTES <= DEFAULT_SNOOZE_MINUTES);
        assert!(DEFAULT_SNOOZE_MINUTES <= MAX_SNOOZE_MINUTES);
        assert!(MIN_MOVEMENT_MS > 0);
    }
}
