//! Gesture action dispatcher.
//!
//! Executes the behaviour bound to a detected `(side, gesture)` pair:
//!
//! | Behaviour     | Effect                                                |
//! |---------------|-------------------------------------------------------|
//! | `Temperature` | Shift the side's target by ±amount (relative)         |
//! | `Alarm`       | Snooze the side's alarm if any alarm is vibrating     |
//! | `Base`        | Toggle relax/flat and move the bed base               |
//!
//! Dispatches run as detached tasks: the poll loop never waits for them
//! and a failing dispatch only logs.

use crate::snooze::{AlarmSnoozer, SnoozeError, SnoozeOutcome};
use crate::status::{SharedStatus, StatusError};
use parking_lot::Mutex;
use slumber_common::alarm::AlarmStore;
use slumber_common::base::{ActuatorError, BaseActuator, BasePreset};
use slumber_common::config::{PresetConfig, SlumberConfig};
use slumber_common::consts::{MIN_MOVEMENT_MS, MOVEMENT_MS_PER_UNIT};
use slumber_common::device::{DeviceControl, DeviceError, DeviceSnapshot, GestureKind, Side};
use slumber_common::gesture::{GestureBehavior, TemperatureChange};
use slumber_common::health::unix_timestamp_secs;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Dispatch errors.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// Temperature update failed.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Snooze failed, including the fail-safe clear.
    #[error(transparent)]
    Snooze(#[from] SnoozeError),

    /// The base refused to move.
    #[error(transparent)]
    Actuator(#[from] ActuatorError),

    /// Base status could not be written.
    #[error(transparent)]
    Status(#[from] StatusError),
}

/// Estimated time for the base to travel between two positions.
///
/// Every position unit on either section takes `MOVEMENT_MS_PER_UNIT`;
/// the slower section dominates. Nothing finishes before `MIN_MOVEMENT_MS`.
pub fn estimate_movement_ms(from_head: u16, from_feet: u16, to_head: u16, to_feet: u16) -> u64 {
    let head_ms = u64::from(from_head.abs_diff(to_head)) * MOVEMENT_MS_PER_UNIT;
    let feet_ms = u64::from(from_feet.abs_diff(to_feet)) * MOVEMENT_MS_PER_UNIT;
    head_ms.max(feet_ms).max(MIN_MOVEMENT_MS)
}

/// Executes gesture behaviours.
pub struct GestureDispatcher<D, A, S> {
    device: Arc<D>,
    actuator: Arc<A>,
    snoozer: AlarmSnoozer<D, S>,
    status: Arc<SharedStatus>,
    presets: PresetConfig,
    snooze_minutes: u32,
    preset: Mutex<BasePreset>,
}

impl<D, A, S> GestureDispatcher<D, A, S>
where
    D: DeviceControl,
    A: BaseActuator,
    S: AlarmStore,
{
    /// Create a dispatcher. The base starts in the flat preset.
    pub fn new(
        config: &SlumberConfig,
        device: Arc<D>,
        actuator: Arc<A>,
        alarms: Arc<S>,
        status: Arc<SharedStatus>,
    ) -> Self {
        Self {
            snoozer: AlarmSnoozer::new(Arc::clone(&device), alarms),
            device,
            actuator,
            status,
            presets: config.presets.clone(),
            snooze_minutes: config.snooze.default_minutes,
            preset: Mutex::new(BasePreset::default()),
        }
    }

    /// Preset the base was last toggled to.
    pub fn current_preset(&self) -> BasePreset {
        *self.preset.lock()
    }

    /// Run `behavior` for a gesture on a detached task.
    ///
    /// The task logs its own failure; the handle is only useful for callers
    /// that want to wait for completion.
    pub fn spawn_dispatch(
        self: &Arc<Self>,
        side: Side,
        gesture: GestureKind,
        behavior: GestureBehavior,
        snapshot: Arc<DeviceSnapshot>,
    ) -> JoinHandle<()> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = dispatcher.dispatch(side, &behavior, &snapshot).await {
                error!("{} {} gesture ({:?}) failed: {}", side, gesture, behavior, e);
            }
        })
    }

    /// Run `behavior` for `side`, reading device state from `snapshot`.
    pub async fn dispatch(
        &self,
        side: Side,
        behavior: &GestureBehavior,
        snapshot: &DeviceSnapshot,
    ) -> Result<(), DispatchError> {
        match *behavior {
            GestureBehavior::Temperature { change, amount } => {
                self.adjust_temperature(side, snapshot, change, amount).await
            }
            GestureBehavior::Alarm => self.snooze(side, snapshot).await,
            GestureBehavior::Base => self.cycle_base().await,
        }
    }

    async fn adjust_temperature(
        &self,
        side: Side,
        snapshot: &DeviceSnapshot,
        change: TemperatureChange,
        amount: i32,
    ) -> Result<(), DispatchError> {
        let current = snapshot.side(side).target_temperature_f;
        let target = change.apply(current, amount);
        info!("Adjusting {} target temperature {} -> {}", side, current, target);
        self.device.set_target_temperature(side, target).await?;
        Ok(())
    }

    async fn snooze(&self, side: Side, snapshot: &DeviceSnapshot) -> Result<(), DispatchError> {
        if !snapshot.any_alarm_vibrating() {
            debug!("Alarm gesture on {} side with no alarm vibrating", side);
            return Ok(());
        }
        match self.snoozer.snooze_alarm(side, self.snooze_minutes).await? {
            SnoozeOutcome::Rearmed { .. } => {}
            SnoozeOutcome::Cleared => warn!("{} alarm cleared instead of snoozed", side),
        }
        Ok(())
    }

    /// Toggle the preset and move the base there.
    ///
    /// The toggle only sticks once the movement command is accepted; on any
    /// failure the preset reverts and `is_moving` is cleared immediately.
    async fn cycle_base(&self) -> Result<(), DispatchError> {
        let (previous, target) = {
            let mut preset = self.preset.lock();
            let previous = *preset;
            *preset = previous.toggled();
            (previous, *preset)
        };

        match self.move_base(target).await {
            Ok(estimate) => {
                info!("Moving base to {} (about {:?})", target, estimate);
                Ok(())
            }
            Err(e) => {
                if let Err(status_err) = self
                    .status
                    .update_base_if_present(|base| base.is_moving = false)
                    .await
                {
                    warn!("Failed to clear base moving flag: {}", status_err);
                }
                *self.preset.lock() = previous;
                warn!("Base move to {} failed, preset reverted to {}", target, previous);
                Err(e)
            }
        }
    }

    async fn move_base(&self, target: BasePreset) -> Result<Duration, DispatchError> {
        let position = self.presets.position(target);
        let origin = self.status.base().unwrap_or_default();

        self.status
            .update_base(|base| {
                base.head = position.head;
                base.feet = position.feet;
                base.is_moving = true;
                base.last_update = unix_timestamp_secs();
                base.is_configured = true;
            })
            .await?;

        match target {
            BasePreset::Flat => self.actuator.go_to_rest().await?,
            BasePreset::Relax => self.actuator.set_position(position).await?,
        }

        let estimate = Duration::from_millis(estimate_movement_ms(
            origin.head,
            origin.feet,
            position.head,
            position.feet,
        ));
        self.schedule_completion(estimate);
        Ok(estimate)
    }

    // Not cancelled on monitor stop: `is_moving` must always return to false.
    fn schedule_completion(&self, after: Duration) {
        let status = Arc::clone(&self.status);
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            match status
                .update_base_if_present(|base| {
                    base.is_moving = false;
                    base.last_update = unix_timestamp_secs();
                })
                .await
            {
                Ok(Some(_)) => debug!("Base movement complete"),
                Ok(None) => debug!("Base status gone before movement completed"),
                Err(e) => warn!("Failed to record base movement completion: {}", e),
            }
        });
    }
}
