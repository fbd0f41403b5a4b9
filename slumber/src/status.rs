//! Shared process status.
//!
//! One [`SharedStatus`] record per process holds the monitor's latest
//! health and the bed-base status. Both are overwritten, never appended.
//! When constructed with a path, every mutation is written out as JSON
//! before the call returns; writes are serialized so the file always
//! reflects the newest in-memory record.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use slumber_common::base::BaseStatus;
use slumber_common::health::HealthRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Status persistence error.
#[derive(Debug, Clone, Error)]
pub enum StatusError {
    /// The status file could not be written.
    #[error("Failed to persist status to {path}: {reason}")]
    Persist {
        /// Target file.
        path: PathBuf,
        /// Underlying error.
        reason: String,
    },
}

/// Serialized status record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Monitor health; `None` until the first poll completes.
    pub health: Option<HealthRecord>,
    /// Bed-base status; `None` until a base gesture is handled.
    pub base: Option<BaseStatus>,
}

/// Process-wide status store shared by the monitor, the dispatcher and
/// deferred movement-completion tasks.
pub struct SharedStatus {
    record: Mutex<StatusRecord>,
    write_lock: tokio::sync::Mutex<()>,
    path: Option<PathBuf>,
}

impl SharedStatus {
    /// Status kept in memory only.
    pub fn in_memory() -> Self {
        Self {
            record: Mutex::new(StatusRecord::default()),
            write_lock: tokio::sync::Mutex::new(()),
            path: None,
        }
    }

    /// Status persisted to `path` after every mutation.
    pub fn persisted<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Self::in_memory()
        }
    }

    /// Copy of the whole record.
    pub fn snapshot(&self) -> StatusRecord {
        self.record.lock().clone()
    }

    /// Latest health record.
    pub fn health(&self) -> Option<HealthRecord> {
        self.record.lock().health.clone()
    }

    /// Current base status.
    pub fn base(&self) -> Option<BaseStatus> {
        self.record.lock().base
    }

    /// Overwrite the health record.
    pub async fn publish_health(&self, health: HealthRecord) -> Result<(), StatusError> {
        let _write = self.write_lock.lock().await;
        let record = {
            let mut record = self.record.lock();
            record.health = Some(health);
            record.clone()
        };
        self.flush(&record).await
    }

    /// Mutate the base status, creating it if absent.
    pub async fn update_base<F>(&self, update: F) -> Result<BaseStatus, StatusError>
    where
        F: FnOnce(&mut BaseStatus) + Send,
    {
        let _write = self.write_lock.lock().await;
        let (base, record) = {
            let mut record = self.record.lock();
            let base = record.base.get_or_insert_with(BaseStatus::default);
            update(base);
            (*base, record.clone())
        };
        self.flush(&record).await?;
        Ok(base)
    }

    /// Mutate the base status only if it exists.
    ///
    /// Returns `Ok(None)` without writing when there is no base status.
    pub async fn update_base_if_present<F>(
        &self,
        update: F,
    ) -> Result<Option<BaseStatus>, StatusError>
    where
        F: FnOnce(&mut BaseStatus) + Send,
    {
        let _write = self.write_lock.lock().await;
        let (base, record) = {
            let mut record = self.record.lock();
            let Some(base) = record.base.as_mut() else {
                return Ok(None);
            };
            update(base);
            (*base, record.clone())
        };
        self.flush(&record).await?;
        Ok(Some(base))
    }

    async fn flush(&self, record: &StatusRecord) -> Result<(), StatusError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let persist_err = |reason: String| StatusError::Persist {
            path: path.clone(),
            reason,
        };

        let serialized =
            serde_json::to_vec_pretty(record).map_err(|e| persist_err(e.to_string()))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| persist_err(e.to_string()))?;
        }
        tokio::fs::write(path, serialized)
            .await
            .map_err(|e| persist_err(e.to_string()))?;

        debug!("Persisted status to {:?}", path);
        Ok(())
    }
}
