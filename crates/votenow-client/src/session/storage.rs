//! Durable storage backends for the session.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, Result};

/// The three string entries kept in client-side storage.
///
/// `user` holds the cached user as a JSON document, matching how the web
/// front end keeps it in its key-value store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl StoredSession {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

/// Persistence backend for [`super::Session`].
///
/// Backends store whole snapshots: a `persist` either lands completely or
/// not at all.
pub trait SessionStorage: Send + Sync {
    /// Read the stored snapshot; an absent store reads as empty.
    fn load(&self) -> Result<StoredSession>;

    /// Replace the stored snapshot.
    fn persist(&self, snapshot: &StoredSession) -> Result<()>;
}

/// Process-local storage, lost when the client is dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    snapshot: Mutex<StoredSession>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: StoredSession) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<StoredSession> {
        Ok(self.snapshot.lock().clone())
    }

    fn persist(&self, snapshot: &StoredSession) -> Result<()> {
        *self.snapshot.lock() = snapshot.clone();
        Ok(())
    }
}

/// JSON file storage.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the previous snapshot intact. An empty
/// snapshot removes the file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<StoredSession> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoredSession::default()),
            Err(e) => {
                return Err(ClientError::storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        if contents.trim().is_empty() {
            return Ok(StoredSession::default());
        }

        serde_json::from_str(&contents).map_err(|e| {
            ClientError::storage(format!("corrupt session file {}: {e}", self.path.display()))
        })
    }

    fn persist(&self, snapshot: &StoredSession) -> Result<()> {
        if snapshot.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => {
                    debug!(path = %self.path.display(), "Removed session file");
                    Ok(())
                }
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(ClientError::storage(format!(
                    "failed to remove {}: {e}",
                    self.path.display()
                ))),
            };
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                ClientError::storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| ClientError::storage(format!("failed to encode session: {e}")))?;

        let tmp = self.temp_path();
        fs::write(&tmp, json)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                ClientError::storage(format!("failed to write {}: {e}", self.path.display()))
            })
    }
}
