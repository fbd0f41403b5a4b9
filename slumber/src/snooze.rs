//! Alarm snooze.
//!
//! Snoozing re-arms the side's persisted alarm for a later trigger time.
//! Only the trigger time changes; intensity, duration and pattern are
//! taken from the stored record. When the alarm cannot be re-armed the
//! device is told to clear the alarm instead, so a failed snooze never
//! leaves the bed vibrating.

use slumber_common::alarm::{AlarmBlob, AlarmError, AlarmStore};
use slumber_common::consts::{
    ALARM_CLEAR_PAYLOAD, DEFAULT_SNOOZE_MINUTES, MAX_SNOOZE_MINUTES, MIN_SNOOZE_MINUTES,
};
use slumber_common::device::{DeviceCommand, DeviceControl, DeviceError, Side};
use slumber_common::health::unix_timestamp_secs;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Snooze errors.
#[derive(Debug, Clone, Error)]
pub enum SnoozeError {
    /// The persisted alarm could not be read or re-encoded.
    #[error(transparent)]
    Alarm(#[from] AlarmError),

    /// The alarm-set command failed.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Re-arming failed and so did the fail-safe clear.
    #[error("snooze failed ({cause}) and alarm clear failed: {source}")]
    ClearFailed {
        /// Why re-arming failed.
        cause: String,
        /// Why the clear command failed.
        source: DeviceError,
    },
}

/// Result of a snooze request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnoozeOutcome {
    /// The alarm was re-armed.
    Rearmed {
        /// New trigger time, whole seconds since the Unix epoch.
        trigger_time: u64,
    },
    /// Re-arming failed; the alarm was cleared instead.
    Cleared,
}

/// Clamp a requested snooze length to the accepted range.
///
/// Values outside `MIN_SNOOZE_MINUTES..=MAX_SNOOZE_MINUTES` are replaced
/// with the default rather than saturated.
pub fn clamp_snooze_minutes(minutes: u32) -> u32 {
    if (MIN_SNOOZE_MINUTES..=MAX_SNOOZE_MINUTES).contains(&minutes) {
        minutes
    } else {
        warn!(
            "Snooze of {} minutes outside {}..={}, using {}",
            minutes, MIN_SNOOZE_MINUTES, MAX_SNOOZE_MINUTES, DEFAULT_SNOOZE_MINUTES
        );
        DEFAULT_SNOOZE_MINUTES
    }
}

/// Re-arms persisted alarms through the device command channel.
pub struct AlarmSnoozer<D, S> {
    device: Arc<D>,
    store: Arc<S>,
}

impl<D: DeviceControl, S: AlarmStore> AlarmSnoozer<D, S> {
    /// Create a snoozer over a command channel and an alarm store.
    pub fn new(device: Arc<D>, store: Arc<S>) -> Self {
        Self { device, store }
    }

    /// Snooze the alarm of `side` for `minutes`.
    ///
    /// On any failure to re-arm, `ALARM_CLEAR` is issued instead and
    /// `SnoozeOutcome::Cleared` returned. The clear is not retried; if it
    /// fails too, `SnoozeError::ClearFailed` is returned.
    pub async fn snooze_alarm(
        &self,
        side: Side,
        minutes: u32,
    ) -> Result<SnoozeOutcome, SnoozeError> {
        match self.rearm(side, minutes).await {
            Ok(trigger_time) => {
                info!("Snoozed {} alarm until {}", side, trigger_time);
                Ok(SnoozeOutcome::Rearmed { trigger_time })
            }
            Err(cause) => {
                error!("Snooze of {} alarm failed, clearing alarm: {}", side, cause);
                self.device
                    .execute(DeviceCommand::AlarmClear, ALARM_CLEAR_PAYLOAD)
                    .await
                    .map_err(|source| SnoozeError::ClearFailed {
                        cause: cause.to_string(),
                        source,
                    })?;
                Ok(SnoozeOutcome::Cleared)
            }
        }
    }

    async fn rearm(&self, side: Side, minutes: u32) -> Result<u64, SnoozeError> {
        let bytes = self.store.read_blob().await?;
        let blob = AlarmBlob::decode(&bytes)?;
        let record = blob.record(side)?;

        let minutes = clamp_snooze_minutes(minutes);
        let trigger_time = unix_timestamp_secs() + u64::from(minutes) * 60;
        let payload = record.retriggered(trigger_time).encode_hex()?;

        self.device
            .execute(DeviceCommand::set_alarm(side), &payload)
            .await?;
        Ok(trigger_time)
    }
}
