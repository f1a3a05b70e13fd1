use std::path::{Path, PathBuf};

use serde_json::Value;
use stockwatch_core::WatchError;
use tracing::{debug, warn};

/// Single-file store for the last raw payload fetched.
///
/// One writer, one reader, last write wins. No locking.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last persisted payload, or `None` when the file is missing or unreadable.
    pub async fn load(&self) -> Option<Value> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no previous snapshot");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring invalid snapshot");
                None
            }
        }
    }

    /// Overwrites the snapshot with pretty-printed JSON, keys in payload order.
    pub async fn save(&self, payload: &Value) -> Result<(), WatchError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| persistence(&self.path, e))?;
        }
        let bytes =
            serde_json::to_vec_pretty(payload).map_err(|e| persistence(&self.path, e))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| persistence(&self.path, e))?;
        debug!(path = %self.path.display(), "snapshot written");
        Ok(())
    }
}

fn persistence(path: &Path, e: impl std::fmt::Display) -> WatchError {
    WatchError::Persistence(format!("{}: {e}", path.display()))
}
