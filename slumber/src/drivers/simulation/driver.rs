//! Simulation driver implementation.
//!
//! `SimulatedPod` implements the device, command channel and actuator
//! traits over one shared in-memory state. Clones share that state, so a
//! test or the binary can keep a handle to inject taps while the monitor
//! polls.

use parking_lot::Mutex;
use slumber_common::alarm::AlarmRecord;
use slumber_common::base::{ActuatorError, BaseActuator, PresetPosition};
use slumber_common::device::{
    DeviceCommand, DeviceConnector, DeviceControl, DeviceError, DeviceHandle, DeviceSnapshot,
    GestureKind, Side, SideStatus, TapState,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Default simulated target temperature (°F).
const DEFAULT_TARGET_F: i32 = 80;

/// Base movement received by the simulated actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// `go_to_rest`.
    Rest,
    /// `set_position`.
    Position(PresetPosition),
}

#[derive(Debug)]
struct PodState {
    snapshot: DeviceSnapshot,
    dropped_connects: u32,
    reject_movements: bool,
    commands: Vec<(DeviceCommand, String)>,
    temperature_updates: Vec<(Side, i32)>,
    movements: Vec<Movement>,
}

impl PodState {
    fn side_mut(&mut self, side: Side) -> &mut SideStatus {
        match side {
            Side::Left => &mut self.snapshot.left,
            Side::Right => &mut self.snapshot.right,
        }
    }
}

/// Software bed.
#[derive(Debug, Clone)]
pub struct SimulatedPod {
    state: Arc<Mutex<PodState>>,
}

/// Connection handle to a [`SimulatedPod`].
#[derive(Debug)]
pub struct SimulatedConnection {
    state: Arc<Mutex<PodState>>,
}

impl SimulatedPod {
    /// Create a bed with the given cover version, both sides idle.
    pub fn new(cover_version: &str) -> Self {
        let side = || SideStatus {
            target_temperature_f: DEFAULT_TARGET_F,
            is_alarm_vibrating: false,
            taps: Some(
                GestureKind::ALL
                    .into_iter()
                    .map(|gesture| (gesture, TapState::Count(0)))
                    .collect::<BTreeMap<_, _>>(),
            ),
        };

        Self {
            state: Arc::new(Mutex::new(PodState {
                snapshot: DeviceSnapshot {
                    cover_version: cover_version.to_string(),
                    left: side(),
                    right: side(),
                },
                dropped_connects: 0,
                reject_movements: false,
                commands: Vec::new(),
                temperature_updates: Vec::new(),
                movements: Vec::new(),
            })),
        }
    }

    /// Register a tap gesture on `side`.
    pub fn tap(&self, side: Side, gesture: GestureKind) {
        let mut state = self.state.lock();
        let taps = state.side_mut(side).taps.get_or_insert_with(BTreeMap::new);
        let next = match taps.get(&gesture) {
            Some(TapState::Count(count)) => TapState::Count(count + 1),
            Some(TapState::Flag(flag)) => TapState::Flag(!flag),
            None => TapState::Count(1),
        };
        taps.insert(gesture, next);
        debug!("Simulated {} on {} side", gesture, side);
    }

    /// Start or stop the alarm vibration of `side`.
    pub fn set_alarm_vibrating(&self, side: Side, vibrating: bool) {
        self.state.lock().side_mut(side).is_alarm_vibrating = vibrating;
    }

    /// Fail the next `count` connection attempts.
    pub fn drop_connections(&self, count: u32) {
        self.state.lock().dropped_connects = count;
    }

    /// Reject (or accept again) base movements.
    pub fn reject_movements(&self, reject: bool) {
        self.state.lock().reject_movements = reject;
    }

    /// Full current status, including taps.
    pub fn status(&self) -> DeviceSnapshot {
        self.state.lock().snapshot.clone()
    }

    /// Commands executed so far, with their payloads.
    pub fn commands(&self) -> Vec<(DeviceCommand, String)> {
        self.state.lock().commands.clone()
    }

    /// Temperature updates received so far.
    pub fn temperature_updates(&self) -> Vec<(Side, i32)> {
        self.state.lock().temperature_updates.clone()
    }

    /// Base movements accepted so far.
    pub fn movements(&self) -> Vec<Movement> {
        self.state.lock().movements.clone()
    }
}

impl DeviceConnector for SimulatedPod {
    type Handle = SimulatedConnection;

    async fn connect(&self) -> Result<SimulatedConnection, DeviceError> {
        let mut state = self.state.lock();
        if state.dropped_connects > 0 {
            state.dropped_connects -= 1;
            return Err(DeviceError::ConnectFailed(
                "simulated disconnect".to_string(),
            ));
        }
        Ok(SimulatedConnection {
            state: Arc::clone(&self.state),
        })
    }
}

impl DeviceHandle for SimulatedConnection {
    async fn snapshot(&mut self, include_gestures: bool) -> Result<DeviceSnapshot, DeviceError> {
        let mut snapshot = self.state.lock().snapshot.clone();
        if !include_gestures {
            snapshot.left.taps = None;
            snapshot.right.taps = None;
        }
        Ok(snapshot)
    }
}

impl DeviceControl for SimulatedPod {
    async fn execute(&self, command: DeviceCommand, payload: &str) -> Result<(), DeviceError> {
        let mut state = self.state.lock();
        match command {
            DeviceCommand::AlarmLeft | DeviceCommand::AlarmRight => {
                let record = AlarmRecord::decode_hex(payload).map_err(|e| {
                    DeviceError::CommandRejected {
                        command,
                        reason: e.to_string(),
                    }
                })?;
                let side = if command == DeviceCommand::AlarmLeft {
                    Side::Left
                } else {
                    Side::Right
                };
                state.side_mut(side).is_alarm_vibrating = false;
                info!("Simulated {} alarm armed for {}", side, record.trigger_time);
            }
            DeviceCommand::AlarmClear => {
                state.snapshot.left.is_alarm_vibrating = false;
                state.snapshot.right.is_alarm_vibrating = false;
                info!("Simulated alarms cleared");
            }
        }
        state.commands.push((command, payload.to_string()));
        Ok(())
    }

    async fn set_target_temperature(
        &self,
        side: Side,
        target_temperature_f: i32,
    ) -> Result<(), DeviceError> {
        let mut state = self.state.lock();
        state.side_mut(side).target_temperature_f = target_temperature_f;
        state.temperature_updates.push((side, target_temperature_f));
        Ok(())
    }
}

impl BaseActuator for SimulatedPod {
    async fn go_to_rest(&self) -> Result<(), ActuatorError> {
        self.record_movement(Movement::Rest)
    }

    async fn set_position(&self, position: PresetPosition) -> Result<(), ActuatorError> {
        self.record_movement(Movement::Position(position))
    }
}

impl SimulatedPod {
    fn record_movement(&self, movement: Movement) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        if state.reject_movements {
            return Err(ActuatorError::Rejected("simulated rejection".to_string()));
        }
        state.movements.push(movement);
        Ok(())
    }
}
