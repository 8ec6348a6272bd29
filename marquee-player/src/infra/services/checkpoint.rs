use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::PathBuf;

use marquee_model::{ItemId, MediaSourceId, PlaybackCheckpoint, Ticks};

/// Local record of the position last reported for the active session.
///
/// Written on every start/progress report, delivered or not, and removed
/// once the server has accepted the stop report. A checkpoint found at launch means
/// the previous run never finished its session.
#[async_trait]
pub trait CheckpointStore: Send + Sync + std::fmt::Debug {
    /// Record the active session position, replacing any earlier checkpoint
    async fn set_active_playback_session(
        &self,
        item_id: ItemId,
        position_ticks: Ticks,
        media_source_id: Option<MediaSourceId>,
    ) -> Result<()>;

    /// Remove the checkpoint. Clearing an empty store is not an error.
    async fn clear_active_playback_session(&self) -> Result<()>;

    /// Checkpoint left behind by an unfinished session
    async fn active_playback_session(&self) -> Result<Option<PlaybackCheckpoint>>;
}

/// JSON file store. Writes go through a sibling temp file and a rename so
/// a crash mid-write keeps the previous checkpoint.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    /// Store the checkpoint as JSON at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn set_active_playback_session(
        &self,
        item_id: ItemId,
        position_ticks: Ticks,
        media_source_id: Option<MediaSourceId>,
    ) -> Result<()> {
        let checkpoint = PlaybackCheckpoint {
            item_id,
            position_ticks,
            media_source_id,
        };
        let bytes = serde_json::to_vec(&checkpoint)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create {}", parent.display())
            })?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes)
            .await
            .with_context(|| format!("Failed to write {}", temp.display()))?;
        tokio::fs::rename(&temp, &self.path).await.with_context(|| {
            format!("Failed to replace {}", self.path.display())
        })?;
        Ok(())
    }

    async fn clear_active_playback_session(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("[Checkpoint] Cleared {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| {
                format!("Failed to remove {}", self.path.display())
            }),
        }
    }

    async fn active_playback_session(&self) -> Result<Option<PlaybackCheckpoint>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read {}", self.path.display())
                });
            }
        };
        let checkpoint = serde_json::from_slice(&bytes).with_context(|| {
            format!("Corrupt checkpoint at {}", self.path.display())
        })?;
        Ok(Some(checkpoint))
    }
}

/// Process-local store for hosts without persistence, and for tests
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    current: Mutex<Option<PlaybackCheckpoint>>,
    fail_writes: Mutex<bool>,
}

impl MemoryCheckpointStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored checkpoint
    pub fn current(&self) -> Option<PlaybackCheckpoint> {
        self.current.lock().clone()
    }

    /// Make every write and clear fail until turned off again
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    fn check_writable(&self) -> Result<()> {
        if *self.fail_writes.lock() {
            anyhow::bail!("checkpoint store is read-only");
        }
        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn set_active_playback_session(
        &self,
        item_id: ItemId,
        position_ticks: Ticks,
        media_source_id: Option<MediaSourceId>,
    ) -> Result<()> {
        self.check_writable()?;
        *self.current.lock() = Some(PlaybackCheckpoint {
            item_id,
            position_ticks,
            media_source_id,
        });
        Ok(())
    }

    async fn clear_active_playback_session(&self) -> Result<()> {
        self.check_writable()?;
        *self.current.lock() = None;
        Ok(())
    }

    async fn active_playback_session(&self) -> Result<Option<PlaybackCheckpoint>> {
        Ok(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("active_session.json");
        let item = ItemId::new();

        let store = FileCheckpointStore::new(&path);
        assert_eq!(store.active_playback_session().await.unwrap(), None);
        store
            .set_active_playback_session(
                item,
                Ticks::from_millis(42_000),
                Some(MediaSourceId::new("src")),
            )
            .await
            .unwrap();

        let reopened = FileCheckpointStore::new(&path);
        let checkpoint =
            reopened.active_playback_session().await.unwrap().unwrap();
        assert_eq!(checkpoint.item_id, item);
        assert_eq!(checkpoint.position_ms(), 42_000);

        reopened.clear_active_playback_session().await.unwrap();
        assert!(!path.exists());
        reopened.clear_active_playback_session().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("active_session.json");
        std::fs::write(&path, b"{not json").unwrap();
        let store = FileCheckpointStore::new(&path);
        assert!(store.active_playback_session().await.is_err());
    }

    #[tokio::test]
    async fn memory_store_can_refuse_writes() {
        let store = MemoryCheckpointStore::new();
        store.set_fail_writes(true);
        assert!(
            store
                .set_active_playback_session(ItemId::new(), Ticks::ZERO, None)
                .await
                .is_err()
        );
        assert_eq!(store.current(), None);
    }
}
