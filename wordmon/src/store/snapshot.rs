//! JSON snapshot of the player registry.
//!
//! Written atomically: the document goes to `<path>.tmp` first and is then
//! renamed over the target, so a crash never leaves a truncated snapshot.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wordmon_core::Player;

use crate::error::StoreError;

/// Environment variable overriding the snapshot path.
pub const SNAPSHOT_PATH_ENV: &str = "WORDMON_SNAPSHOT_PATH";

/// Snapshot path used when none is configured.
pub const DEFAULT_SNAPSHOT_PATH: &str = "data/snapshot.json";

/// Saved game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// When the snapshot was taken
    pub updated_at: DateTime<Utc>,
    /// Every registered player
    pub players: Vec<Player>,
}

impl Snapshot {
    /// Captures `players` now.
    #[must_use]
    pub fn new(players: Vec<Player>) -> Self {
        Self {
            updated_at: Utc::now(),
            players,
        }
    }

    /// Reads a snapshot, returning `None` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Snapshot`] when the file cannot be read or is
    /// not a valid snapshot.
    pub fn load(path: &Path) -> Result<Option<Self>, StoreError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(snapshot_error(path, &e)),
        };
        let snapshot = serde_json::from_str(&raw).map_err(|e| snapshot_error(path, &e))?;
        Ok(Some(snapshot))
    }

    /// Writes the snapshot atomically, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Snapshot`] when any filesystem step fails. The
    /// temporary file is removed on a failed rename.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| snapshot_error(path, &e))?;
        }

        let data = serde_json::to_vec_pretty(self).map_err(|e| snapshot_error(path, &e))?;
        let tmp = tmp_path(path);
        std::fs::write(&tmp, data).map_err(|e| snapshot_error(&tmp, &e))?;

        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(snapshot_error(path, &e));
        }
        tracing::debug!(path = %path.display(), players = self.players.len(), "snapshot saved");
        Ok(())
    }
}

/// Resolves the snapshot path: the explicit one, else
/// `WORDMON_SNAPSHOT_PATH`, else [`DEFAULT_SNAPSHOT_PATH`].
#[must_use]
pub fn resolve_snapshot_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| {
            std::env::var_os(SNAPSHOT_PATH_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn snapshot_error(path: &Path, err: &dyn std::fmt::Display) -> StoreError {
    StoreError::Snapshot {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
