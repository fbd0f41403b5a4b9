//! Device monitor loop.
//!
//! The `Monitor` polls the device on a cadence derived from the cover's
//! capabilities, diffs consecutive snapshots for tap gestures, hands them
//! to the [`GestureDispatcher`] and publishes its health after every poll.
//!
//! # Loop
//!
//! ```text
//!  connect ─▶ probe snapshot ─▶ pick cadence ─┐
//!                                             ▼
//!  ┌─▶ sleep(cadence) ─▶ connect ─▶ snapshot ─▶ refresh settings
//!  │        ▲                                        │
//!  │        └── sleep(cadence) ◀── failed ◀──────────┤
//!  │                                                 ▼
//!  └──────────────── healthy ◀── diff + dispatch (detached)
//! ```
//!
//! Only the start-up probe can end the loop with an error. Failures inside
//! the loop are published as `failed` health and retried; the loop exits
//! when [`Monitor::stop`] clears the running flag.

use crate::dispatcher::GestureDispatcher;
use crate::gestures::detect_gestures;
use crate::status::SharedStatus;
use slumber_common::alarm::AlarmStore;
use slumber_common::base::BaseActuator;
use slumber_common::config::{MonitorConfig, SlumberConfig};
use slumber_common::device::{
    DeviceConnector, DeviceControl, DeviceError, DeviceHandle, DeviceSnapshot, Side,
};
use slumber_common::gesture::{GestureSettings, SettingsError, SettingsStore};
use slumber_common::health::HealthRecord;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Errors from a single poll.
#[derive(Debug, Clone, Error)]
pub enum MonitorError {
    /// Connecting or fetching the snapshot failed.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Settings could not be refreshed.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Result of one successful poll.
pub struct PollOutcome {
    /// Freshly fetched snapshot.
    pub snapshot: Arc<DeviceSnapshot>,
    /// Handles of the gesture dispatches started by this poll.
    pub dispatches: Vec<JoinHandle<()>>,
}

/// Running flag plus the generation of the loop that owns it.
///
/// Both change together under one lock, so a loop ending late can never
/// clear the flag of a loop started after it.
#[derive(Debug, Default)]
struct LoopState {
    running: bool,
    epoch: u64,
}

/// Polls the device and turns tap gestures into actions.
///
/// `D` is both the connection provider and the command channel; `S`
/// supplies gesture settings, `A` moves the base and `B` holds the
/// persisted alarms.
pub struct Monitor<D, S, A, B> {
    device: Arc<D>,
    settings: Arc<S>,
    dispatcher: Arc<GestureDispatcher<D, A, B>>,
    status: Arc<SharedStatus>,
    config: MonitorConfig,
    state: Arc<Mutex<LoopState>>,
}

impl<D, S, A, B> Clone for Monitor<D, S, A, B> {
    fn clone(&self) -> Self {
        Self {
            device: Arc::clone(&self.device),
            settings: Arc::clone(&self.settings),
            dispatcher: Arc::clone(&self.dispatcher),
            status: Arc::clone(&self.status),
            config: self.config.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<D, S, A, B> Monitor<D, S, A, B>
where
    D: DeviceConnector + DeviceControl,
    S: SettingsStore,
    A: BaseActuator,
    B: AlarmStore,
{
    /// Wire a monitor to its collaborators.
    pub fn new(
        config: &SlumberConfig,
        device: Arc<D>,
        settings: Arc<S>,
        actuator: Arc<A>,
        alarms: Arc<B>,
        status: Arc<SharedStatus>,
    ) -> Self {
        let dispatcher = Arc::new(GestureDispatcher::new(
            config,
            Arc::clone(&device),
            actuator,
            alarms,
            Arc::clone(&status),
        ));

        Self {
            device,
            settings,
            dispatcher,
            status,
            config: config.monitor.clone(),
            state: Arc::new(Mutex::new(LoopState::default())),
        }
    }

    /// Whether the loop is (or is about to be) running.
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Gesture dispatcher used by this monitor.
    pub fn dispatcher(&self) -> &Arc<GestureDispatcher<D, A, B>> {
        &self.dispatcher
    }

    /// Shared status record this monitor publishes to.
    pub fn status(&self) -> &Arc<SharedStatus> {
        &self.status
    }

    /// Start the loop on a new task.
    ///
    /// Returns `None` without side effects if the monitor is already
    /// running. An error escaping the loop is published as `failed` health;
    /// the loop is not restarted.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        let epoch = {
            let mut state = self.state.lock();
            if state.running {
                info!("Monitor already running");
                return None;
            }
            state.running = true;
            state.epoch += 1;
            state.epoch
        };
        info!("Starting monitor");

        let monitor = self.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = monitor.run(epoch).await {
                error!("Monitor loop failed: {}", e);
                monitor.publish_health(HealthRecord::failed(e.to_string())).await;
            }
            let mut state = monitor.state.lock();
            if state.epoch == epoch {
                state.running = false;
            }
        }))
    }

    /// Ask the loop to exit at its next check point. Idempotent.
    ///
    /// In-flight device calls, dispatches and scheduled base-movement
    /// completions are not cancelled.
    pub fn stop(&self) {
        let was_running = std::mem::replace(&mut self.state.lock().running, false);
        if was_running {
            info!("Stopping monitor");
        }
    }

    /// Poll cadence for a device reporting `snapshot`.
    pub fn poll_cadence(&self, snapshot: &DeviceSnapshot) -> Duration {
        if self.supports_gestures(snapshot) {
            self.config.fast_cadence()
        } else {
            self.config.slow_cadence()
        }
    }

    /// Fetch a fresh snapshot, refresh settings and dispatch gestures
    /// detected against `previous`.
    pub async fn poll_once(&self, previous: &DeviceSnapshot) -> Result<PollOutcome, MonitorError> {
        let gestures = self.supports_gestures(previous);
        let snapshot = Arc::new(self.fetch_snapshot(gestures).await?);
        let settings = self.settings.refresh().await?;

        let dispatches = if gestures {
            self.dispatch_gestures(Some(previous), &snapshot, &settings)
        } else {
            Vec::new()
        };
        Ok(PollOutcome {
            snapshot,
            dispatches,
        })
    }

    /// Diff `previous` against `next` on both sides and start a dispatch for
    /// every bound gesture.
    ///
    /// A side that fails to diff is logged and skipped; the other side is
    /// still processed. Without a previous snapshot nothing is dispatched.
    pub fn dispatch_gestures(
        &self,
        previous: Option<&DeviceSnapshot>,
        next: &Arc<DeviceSnapshot>,
        settings: &GestureSettings,
    ) -> Vec<JoinHandle<()>> {
        let Some(previous) = previous else {
            warn!("No previous snapshot, skipping gesture detection");
            return Vec::new();
        };

        let mut dispatches = Vec::new();
        for side in Side::ALL {
            let gestures = match detect_gestures(previous, next, side) {
                Ok(gestures) => gestures,
                Err(e) => {
                    error!("Gesture detection failed for {} side: {}", side, e);
                    continue;
                }
            };
            for gesture in gestures {
                match settings.behavior(side, gesture) {
                    Some(behavior) => {
                        info!("Detected {} on {} side", gesture, side);
                        dispatches.push(self.dispatcher.spawn_dispatch(
                            side,
                            gesture,
                            behavior.clone(),
                            Arc::clone(next),
                        ));
                    }
                    None => debug!("No behaviour bound to {} on {} side", gesture, side),
                }
            }
        }
        dispatches
    }

    async fn run(&self, epoch: u64) -> Result<(), MonitorError> {
        let probe = self.fetch_snapshot(false).await?;
        let mut cadence = self.poll_cadence(&probe);
        let mut current = if self.supports_gestures(&probe) {
            Arc::new(self.fetch_snapshot(true).await?)
        } else {
            Arc::new(probe)
        };
        info!(
            "Monitoring cover {:?} every {:?} (gestures: {})",
            current.cover_version,
            cadence,
            self.supports_gestures(&current)
        );

        while self.is_active(epoch) {
            tokio::time::sleep(cadence).await;
            if !self.is_active(epoch) {
                break;
            }

            cadence = self.poll_cadence(&current);
            match self.poll_once(&current).await {
                Ok(outcome) => {
                    // Dispatches are detached; the loop does not wait for them.
                    drop(outcome.dispatches);
                    current = outcome.snapshot;
                    self.publish_health(HealthRecord::healthy()).await;
                }
                Err(e) => {
                    error!("Monitor poll failed: {}", e);
                    self.publish_health(HealthRecord::failed(e.to_string())).await;
                    tokio::time::sleep(cadence).await;
                }
            }
        }

        info!("Monitor stopped");
        Ok(())
    }

    async fn fetch_snapshot(&self, include_gestures: bool) -> Result<DeviceSnapshot, DeviceError> {
        let mut handle = self.device.connect().await?;
        handle.snapshot(include_gestures).await
    }

    async fn publish_health(&self, record: HealthRecord) {
        if let Err(e) = self.status.publish_health(record).await {
            warn!("Failed to publish health: {}", e);
        }
    }

    fn supports_gestures(&self, snapshot: &DeviceSnapshot) -> bool {
        snapshot.supports_gestures(&self.config.gestureless_cover_version)
    }

    fn is_active(&self, epoch: u64) -> bool {
        let state = self.state.lock();
        state.running && state.epoch == epoch
    }
}
