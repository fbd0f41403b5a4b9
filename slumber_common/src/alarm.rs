//! Persisted alarm records.
//!
//! The alarm blob is a whole-record binary file holding at most one
//! [`AlarmRecord`] per side. Records are encoded with bincode, the same
//! format the device expects inside the hex payload of an alarm-set
//! command.

use crate::device::Side;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Alarm parameters of one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRecord {
    /// Vibration intensity payload.
    #[serde(rename = "pl")]
    pub payload: u8,
    /// Alarm duration in seconds.
    #[serde(rename = "du")]
    pub duration: u32,
    /// Trigger time, whole seconds since the Unix epoch.
    #[serde(rename = "tt")]
    pub trigger_time: u64,
    /// Vibration pattern identifier.
    #[serde(rename = "pi")]
    pub pattern: String,
}

impl AlarmRecord {
    /// Copy of this record re-armed for `trigger_time`.
    pub fn retriggered(&self, trigger_time: u64) -> Self {
        Self {
            trigger_time,
            ..self.clone()
        }
    }

    /// Encode to the hex form carried by alarm-set commands.
    pub fn encode_hex(&self) -> Result<String, AlarmError> {
        let bytes = bincode::serialize(self).map_err(|e| AlarmError::Encode(e.to_string()))?;
        Ok(hex::encode(bytes))
    }

    /// Decode a record from its command hex form.
    pub fn decode_hex(payload: &str) -> Result<Self, AlarmError> {
        let bytes = hex::decode(payload).map_err(|e| AlarmError::Decode(e.to_string()))?;
        bincode::deserialize(&bytes).map_err(|e| AlarmError::Decode(e.to_string()))
    }
}

/// Contents of the persisted alarm blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmBlob {
    /// Left side alarm, if armed.
    pub left: Option<AlarmRecord>,
    /// Right side alarm, if armed.
    pub right: Option<AlarmRecord>,
}

impl AlarmBlob {
    /// Decode the whole blob.
    pub fn decode(bytes: &[u8]) -> Result<Self, AlarmError> {
        bincode::deserialize(bytes).map_err(|e| AlarmError::Decode(e.to_string()))
    }

    /// Encode the whole blob.
    pub fn encode(&self) -> Result<Vec<u8>, AlarmError> {
        bincode::serialize(self).map_err(|e| AlarmError::Encode(e.to_string()))
    }

    /// Record stored for `side`.
    ///
    /// # Errors
    /// Returns `AlarmError::MissingSide` if the side has no record.
    pub fn record(&self, side: Side) -> Result<&AlarmRecord, AlarmError> {
        let record = match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        };
        record.ok_or(AlarmError::MissingSide(side))
    }

    /// Store a record for `side`.
    pub fn set(&mut self, side: Side, record: AlarmRecord) {
        match side {
            Side::Left => self.left = Some(record),
            Side::Right => self.right = Some(record),
        }
    }
}

/// Persistence-format errors.
#[derive(Debug, Clone, Error)]
pub enum AlarmError {
    /// The blob could not be read.
    #[error("Failed to read alarm blob: {0}")]
    Read(String),

    /// The blob or payload is not a valid encoding.
    #[error("Failed to decode alarm data: {0}")]
    Decode(String),

    /// The blob has no record for the side.
    #[error("No alarm record for {0} side")]
    MissingSide(Side),

    /// A record could not be encoded.
    #[error("Failed to encode alarm record: {0}")]
    Encode(String),

    /// The blob could not be written.
    #[error("Failed to write alarm blob: {0}")]
    Write(String),
}

/// Read access to the persisted alarm blob.
pub trait AlarmStore: Send + Sync + 'static {
    /// Read the raw blob in full.
    fn read_blob(&self) -> impl Future<Output = Result<Vec<u8>, AlarmError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AlarmRecord {
        AlarmRecord {
            payload: 80,
            duration: 600,
            trigger_time: 1_700_000_000,
            pattern: "rise".to_string(),
        }
    }

    #[test]
    fn test_retriggered_keeps_parameters() {
        let original = record();
        let next = original.retriggered(1_700_000_600);
        assert_eq!(next.trigger_time, 1_700_000_600);
        assert_eq!(next.payload, original.payload);
        assert_eq!(next.duration, original.duration);
        assert_eq!(next.pattern, original.pattern);
    }

    #[test]
    fn test_hex_payload_decodes_to_same_record() {
        let hex = record().encode_hex().unwrap();
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(AlarmRecord::decode_hex(&hex).unwrap(), record());
    }

    #[test]
    fn test_blob_missing_side() {
        let mut blob = AlarmBlob::default();
        blob.set(Side::Left, record());

        let decoded = AlarmBlob::decode(&blob.encode().unwrap()).unwrap();
        assert_eq!(decoded.record(Side::Left).unwrap(), &record());
        assert!(matches!(
            decoded.record(Side::Right),
            Err(AlarmError::MissingSide(Side::Right))
        ));
    }

    #[test]
    fn test_garbage_blob_fails_to_decode() {
        assert!(matches!(AlarmBlob::decode(&[]), Err(AlarmError::Decode(_))));
        assert!(matches!(AlarmBlob::decode(&[0xFF, 0x01]), Err(AlarmError::Decode(_))));
        assert!(matches!(AlarmRecord::decode_hex("zz"), Err(AlarmError::Decode(_))));
    }
}
