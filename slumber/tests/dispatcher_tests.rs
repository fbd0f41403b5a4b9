//! # Dispatcher Tests
//!
//! Gesture behaviours executed against the simulated bed:
//!
//! - Relative temperature changes
//! - Alarm gesture with and without a vibrating alarm
//! - Base preset toggling, movement tracking and rollback

use slumber::drivers::simulation::{Movement, SimulatedPod};
use slumber::stores::MemoryAlarmStore;
use slumber::{DispatchError, GestureDispatcher, SharedStatus};
use slumber_common::alarm::{AlarmBlob, AlarmRecord};
use slumber_common::base::{BasePreset, PresetPosition};
use slumber_common::config::SlumberConfig;
use slumber_common::device::{DeviceCommand, DeviceSnapshot, GestureKind, Side};
use slumber_common::gesture::{GestureBehavior, TemperatureChange};
use std::sync::Arc;
use std::time::Duration;

type Dispatcher = GestureDispatcher<SimulatedPod, SimulatedPod, MemoryAlarmStore>;

// ─── Helpers ────────────────────────────────────────────────────────

const RELAX: PresetPosition = PresetPosition {
    head: 10,
    feet: 1,
    feed_rate: 50,
};

fn dispatcher(
    pod: &SimulatedPod,
    alarms: MemoryAlarmStore,
) -> (Arc<Dispatcher>, Arc<SharedStatus>) {
    let status = Arc::new(SharedStatus::in_memory());
    let device = Arc::new(pod.clone());
    let dispatcher = Arc::new(GestureDispatcher::new(
        &SlumberConfig::default(),
        Arc::clone(&device),
        device,
        Arc::new(alarms),
        Arc::clone(&status),
    ));
    (dispatcher, status)
}

fn snapshot_at(pod: &SimulatedPod, left_f: i32) -> DeviceSnapshot {
    let mut snapshot = pod.status();
    snapshot.left.target_temperature_f = left_f;
    snapshot
}

fn alarm_blob() -> MemoryAlarmStore {
    let mut blob = AlarmBlob::default();
    blob.set(
        Side::Left,
        AlarmRecord {
            payload: 80,
            duration: 300,
            trigger_time: 1_700_000_000,
            pattern: "rise".to_string(),
        },
    );
    MemoryAlarmStore::from_blob(&blob).unwrap()
}

// ─── Temperature ────────────────────────────────────────────────────

#[tokio::test]
async fn test_temperature_increment_is_relative() {
    let pod = SimulatedPod::new("Pod 4");
    let (dispatcher, _) = dispatcher(&pod, MemoryAlarmStore::empty());
    let behavior = GestureBehavior::Temperature {
        change: TemperatureChange::Increment,
        amount: 2,
    };

    dispatcher
        .dispatch(Side::Left, &behavior, &snapshot_at(&pod, 70))
        .await
        .unwrap();

    assert_eq!(pod.temperature_updates(), vec![(Side::Left, 72)]);
    assert_eq!(pod.status().left.target_temperature_f, 72);
    assert_eq!(pod.status().right.target_temperature_f, 80);
}

#[tokio::test]
async fn test_temperature_decrement_is_relative() {
    let pod = SimulatedPod::new("Pod 4");
    let (dispatcher, _) = dispatcher(&pod, MemoryAlarmStore::empty());
    let behavior = GestureBehavior::Temperature {
        change: TemperatureChange::Decrement,
        amount: 2,
    };

    dispatcher
        .dispatch(Side::Left, &behavior, &snapshot_at(&pod, 70))
        .await
        .unwrap();

    assert_eq!(pod.temperature_updates(), vec![(Side::Left, 68)]);
}

// ─── Alarm ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_alarm_gesture_without_vibration_is_noop() {
    let pod = SimulatedPod::new("Pod 4");
    let (dispatcher, _) = dispatcher(&pod, alarm_blob());

    dispatcher
        .dispatch(Side::Left, &GestureBehavior::Alarm, &pod.status())
        .await
        .unwrap();

    assert!(pod.commands().is_empty());
}

#[tokio::test]
async fn test_alarm_gesture_snoozes_tapped_side() {
    let pod = SimulatedPod::new("Pod 4");
    pod.set_alarm_vibrating(Side::Left, true);
    let (dispatcher, _) = dispatcher(&pod, alarm_blob());

    let handle = dispatcher.spawn_dispatch(
        Side::Left,
        GestureKind::QuadTap,
        GestureBehavior::Alarm,
        Arc::new(pod.status()),
    );
    handle.await.unwrap();

    let commands = pod.commands();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].0, DeviceCommand::AlarmLeft);
    assert!(!pod.status().left.is_alarm_vibrating);
}

// ─── Base ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_base_gesture_toggles_between_presets() {
    let pod = SimulatedPod::new("Pod 4");
    let (dispatcher, status) = dispatcher(&pod, MemoryAlarmStore::empty());
    assert_eq!(dispatcher.current_preset(), BasePreset::Flat);

    dispatcher
        .dispatch(Side::Right, &GestureBehavior::Base, &pod.status())
        .await
        .unwrap();

    assert_eq!(dispatcher.current_preset(), BasePreset::Relax);
    let base = status.base().unwrap();
    assert_eq!((base.head, base.feet), (10, 1));
    assert!(base.is_moving);
    assert!(base.is_configured);

    // Flat to relax is a short move: the 3 s floor applies.
    tokio::time::sleep(Duration::from_millis(3_100)).await;
    assert!(!status.base().unwrap().is_moving);

    dispatcher
        .dispatch(Side::Right, &GestureBehavior::Base, &pod.status())
        .await
        .unwrap();

    assert_eq!(dispatcher.current_preset(), BasePreset::Flat);
    assert_eq!(pod.movements(), vec![Movement::Position(RELAX), Movement::Rest]);
    let base = status.base().unwrap();
    assert_eq!((base.head, base.feet), (0, 0));
    assert!(base.is_moving);
}

#[tokio::test(start_paused = true)]
async fn test_base_movement_completes_after_estimate() {
    let pod = SimulatedPod::new("Pod 4");
    let (dispatcher, status) = dispatcher(&pod, MemoryAlarmStore::empty());

    dispatcher
        .dispatch(Side::Left, &GestureBehavior::Base, &pod.status())
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2_900)).await;
    assert!(status.base().unwrap().is_moving);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!status.base().unwrap().is_moving);
}

#[tokio::test]
async fn test_base_failure_reverts_preset_and_clears_moving() {
    let pod = SimulatedPod::new("Pod 4");
    pod.reject_movements(true);
    let (dispatcher, status) = dispatcher(&pod, MemoryAlarmStore::empty());

    let result = dispatcher
        .dispatch(Side::Left, &GestureBehavior::Base, &pod.status())
        .await;

    assert!(matches!(result, Err(DispatchError::Actuator(_))));
    assert_eq!(dispatcher.current_preset(), BasePreset::Flat);
    assert!(pod.movements().is_empty());

    let base = status.base().unwrap();
    assert!(!base.is_moving);
}

#[tokio::test]
async fn test_base_recovers_after_rejected_move() {
    let pod = SimulatedPod::new("Pod 4");
    pod.reject_movements(true);
    let (dispatcher, _) = dispatcher(&pod, MemoryAlarmStore::empty());

    let _ = dispatcher
        .dispatch(Side::Left, &GestureBehavior::Base, &pod.status())
        .await;

    pod.reject_movements(false);
    dispatcher
        .dispatch(Side::Left, &GestureBehavior::Base, &pod.status())
        .await
        .unwrap();

    // The failed toggle did not count: the next gesture still goes to relax.
    assert_eq!(dispatcher.current_preset(), BasePreset::Relax);
    assert_eq!(pod.movements(), vec![Movement::Position(RELAX)]);
}
