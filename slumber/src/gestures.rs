//! Gesture detection.
//!
//! A gesture is reported when the tap state of a side changes between two
//! consecutive snapshots. Only transitions matter; the initial state of a
//! freshly connected cover is never treated as a gesture.

use slumber_common::device::{DeviceSnapshot, GestureKind, Side};
use thiserror::Error;

/// Per-side detection failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureError {
    /// One of the snapshots was fetched without tap fields.
    #[error("{which} snapshot has no tap data for the {side} side")]
    MissingTapData {
        /// Affected side.
        side: Side,
        /// `"previous"` or `"next"`.
        which: &'static str,
    },
}

/// Gestures whose tap state differs between `previous` and `next` for `side`.
///
/// Each gesture kind is reported at most once, in [`GestureKind::ALL`]
/// order. An entry present in one snapshot and missing in the other counts
/// as a change.
pub fn detect_gestures(
    previous: &DeviceSnapshot,
    next: &DeviceSnapshot,
    side: Side,
) -> Result<Vec<GestureKind>, GestureError> {
    let before = previous
        .side(side)
        .taps
        .as_ref()
        .ok_or(GestureError::MissingTapData {
            side,
            which: "previous",
        })?;
    let after = next
        .side(side)
        .taps
        .as_ref()
        .ok_or(GestureError::MissingTapData { side, which: "next" })?;

    Ok(GestureKind::ALL
        .into_iter()
        .filter(|gesture| before.get(gesture) != after.get(gesture))
        .collect())
}
