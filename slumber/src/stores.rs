//! Alarm blob and settings stores.
//!
//! File-backed stores are used by the binary; the in-memory variants back
//! the simulation mode and tests.

use parking_lot::RwLock;
use slumber_common::alarm::{AlarmBlob, AlarmError, AlarmStore};
use slumber_common::gesture::{GestureSettings, SettingsError, SettingsStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ─── Alarm blob ─────────────────────────────────────────────────────

/// Alarm blob stored in a single file.
pub struct FileAlarmStore {
    path: PathBuf,
}

impl FileAlarmStore {
    /// Create a store for the blob at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the blob.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the whole blob.
    pub async fn write(&self, blob: &AlarmBlob) -> Result<(), AlarmError> {
        let bytes = blob.encode()?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AlarmError::Write(format!("{}: {e}", parent.display())))?;
        }
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| AlarmError::Write(format!("{}: {e}", self.path.display())))?;
        info!("Wrote alarm blob to {:?}", self.path);
        Ok(())
    }
}

impl AlarmStore for FileAlarmStore {
    async fn read_blob(&self) -> Result<Vec<u8>, AlarmError> {
        debug!("Reading alarm blob from {:?}", self.path);
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| AlarmError::Read(format!("{}: {e}", self.path.display())))
    }
}

/// Alarm blob held in memory.
#[derive(Default)]
pub struct MemoryAlarmStore {
    bytes: RwLock<Option<Vec<u8>>>,
}

impl MemoryAlarmStore {
    /// Store with no blob; every read fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store holding raw `bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: RwLock::new(Some(bytes)),
        }
    }

    /// Store holding the encoded `blob`.
    pub fn from_blob(blob: &AlarmBlob) -> Result<Self, AlarmError> {
        Ok(Self::from_bytes(blob.encode()?))
    }

    /// Replace the stored bytes.
    pub fn replace(&self, bytes: Option<Vec<u8>>) {
        *self.bytes.write() = bytes;
    }
}

impl AlarmStore for MemoryAlarmStore {
    async fn read_blob(&self) -> Result<Vec<u8>, AlarmError> {
        self.bytes
            .read()
            .clone()
            .ok_or_else(|| AlarmError::Read("no alarm blob stored".to_string()))
    }
}

// ─── Settings ───────────────────────────────────────────────────────

/// Gesture settings read from a JSON file on every refresh.
///
/// A missing file means no gestures are bound.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    /// Create a store for the settings file at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SettingsStore for JsonSettingsStore {
    async fn refresh(&self) -> Result<GestureSettings, SettingsError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => GestureSettings::from_json(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings file at {:?}, no gestures bound", self.path);
                Ok(GestureSettings::default())
            }
            Err(e) => Err(SettingsError::Read(format!("{}: {e}", self.path.display()))),
        }
    }
}

/// Gesture settings held in memory.
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: RwLock<GestureSettings>,
}

impl MemorySettingsStore {
    /// Store holding `settings`.
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// Replace the stored settings.
    pub fn replace(&self, settings: GestureSettings) {
        *self.settings.write() = settings;
    }
}

impl SettingsStore for MemorySettingsStore {
    async fn refresh(&self) -> Result<GestureSettings, SettingsError> {
        Ok(self.settings.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slumber_common::alarm::AlarmRecord;
    use slumber_common::device::{GestureKind, Side};
    use slumber_common::gesture::GestureBehavior;
    use tempfile::tempdir;

    fn blob() -> AlarmBlob {
        let mut blob = AlarmBlob::default();
        blob.set(
            Side::Right,
            AlarmRecord {
                payload: 50,
                duration: 300,
                trigger_time: 1_700_000_000,
                pattern: "double".to_string(),
            },
        );
        blob
    }

    #[tokio::test]
    async fn test_file_alarm_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileAlarmStore::new(dir.path().join("persist").join("alarm.bin"));

        store.write(&blob()).await.unwrap();
        let bytes = store.read_blob().await.unwrap();
        assert_eq!(AlarmBlob::decode(&bytes).unwrap(), blob());
    }

    #[tokio::test]
    async fn test_file_alarm_store_write_failure() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let store = FileAlarmStore::new(blocker.join("alarm.bin"));
        let err = store.write(&blob()).await.unwrap_err();
        assert!(matches!(err, AlarmError::Write(_)), "got {err:?}");
        assert!(err.to_string().contains("write"));
    }

    #[tokio::test]
    async fn test_file_alarm_store_missing_file() {
        let dir = tempdir().unwrap();
        let store = FileAlarmStore::new(dir.path().join("missing.bin"));
        assert!(matches!(store.read_blob().await, Err(AlarmError::Read(_))));
    }

    #[tokio::test]
    async fn test_memory_alarm_store() {
        let store = MemoryAlarmStore::empty();
        assert!(store.read_blob().await.is_err());

        store.replace(Some(vec![1, 2, 3]));
        assert_eq!(store.read_blob().await.unwrap(), vec![1, 2, 3]);

        let store = MemoryAlarmStore::from_blob(&blob()).unwrap();
        let decoded = AlarmBlob::decode(&store.read_blob().await.unwrap()).unwrap();
        assert_eq!(decoded, blob());
    }

    #[tokio::test]
    async fn test_json_settings_store_reads_latest_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = JsonSettingsStore::new(&path);

        // Missing file: nothing bound.
        assert_eq!(store.refresh().await.unwrap(), GestureSettings::default());

        std::fs::write(
            &path,
            r#"{ "left": { "taps": { "doubleTap": { "type": "base" } } } }"#,
        )
        .unwrap();
        let settings = store.refresh().await.unwrap();
        assert_eq!(
            settings.behavior(Side::Left, GestureKind::DoubleTap),
            Some(&GestureBehavior::Base)
        );

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            store.refresh().await,
            Err(SettingsError::Parse(_))
        ));
    }
}
