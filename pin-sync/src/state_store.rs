//! Persisted publication state, one JSON file per namespace.
//!
//! Layout: `<state_root>/<namespace>/state.json`. Saves go through a
//! temporary file that is synced and renamed over the old file, so a reader
//! never sees a half-written mapping. A file that cannot be read is moved
//! aside with [`StateStore::set_aside`] before it would be overwritten.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use pin_types::{Namespace, PublicationState};
use tokio::io::AsyncWriteExt;

use crate::error::{StateLoadError, StateSaveError};

/// Name of the state file inside a namespace directory.
pub const STATE_FILE: &str = "state.json";

/// Suffix of a state file moved aside because it could not be read.
pub const CORRUPT_SUFFIX: &str = ".corrupt-";

/// Loads and saves [`PublicationState`] per namespace.
#[derive(Debug, Clone)]
pub struct StateStore {
    root: PathBuf,
}

impl StateStore {
    /// Create a store rooted at `root` (usually `<assets_root>/data`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The state root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one namespace's files.
    pub fn namespace_dir(&self, namespace: &Namespace) -> PathBuf {
        self.root.join(namespace.as_str())
    }

    /// Path of one namespace's state file.
    pub fn state_path(&self, namespace: &Namespace) -> PathBuf {
        self.namespace_dir(namespace).join(STATE_FILE)
    }

    /// Read the state for `namespace`, reporting why it could not be read.
    pub async fn try_load(&self, namespace: &Namespace) -> Result<PublicationState, StateLoadError> {
        let path = self.state_path(namespace);
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StateLoadError::NotFound { path });
            }
            Err(source) => return Err(StateLoadError::Read { path, source }),
        };

        serde_json::from_slice(&contents).map_err(|source| StateLoadError::Parse { path, source })
    }

    /// Read the state for `namespace`, falling back to empty state.
    ///
    /// A missing file is the normal first-run case. An unreadable or
    /// malformed file is logged and also treated as empty.
    pub async fn load(&self, namespace: &Namespace) -> PublicationState {
        match self.try_load(namespace).await {
            Ok(state) => {
                tracing::debug!(
                    namespace = %namespace,
                    records = state.len(),
                    published = state.published_count(),
                    "Loaded state"
                );
                state
            }
            Err(StateLoadError::NotFound { path }) => {
                tracing::debug!("No state at {}, starting empty", path.display());
                PublicationState::new()
            }
            Err(e) => {
                tracing::warn!("{}; starting from empty state", e);
                PublicationState::new()
            }
        }
    }

    /// Move an unreadable state file to `state.json.corrupt-<unix secs>`.
    ///
    /// Returns the new path. Called before a save would replace a file whose
    /// records were never loaded.
    pub async fn set_aside(&self, namespace: &Namespace) -> Result<PathBuf, StateSaveError> {
        let path = self.state_path(namespace);
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let backup = path.with_file_name(format!("{STATE_FILE}{CORRUPT_SUFFIX}{secs}"));

        tokio::fs::rename(&path, &backup)
            .await
            .map_err(|source| StateSaveError::SetAside {
                path: path.clone(),
                source,
            })?;

        tracing::warn!("Moved unreadable state file to {}", backup.display());
        Ok(backup)
    }

    /// Write the full state for `namespace`, replacing the previous file.
    pub async fn save(
        &self,
        namespace: &Namespace,
        state: &PublicationState,
    ) -> Result<(), StateSaveError> {
        let dir = self.namespace_dir(namespace);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StateSaveError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        let mut contents = serde_json::to_vec_pretty(state).map_err(StateSaveError::Serialize)?;
        contents.push(b'\n');

        let path = dir.join(STATE_FILE);
        let tmp_path = dir.join(format!("{STATE_FILE}.tmp"));
        write_synced(&tmp_path, &contents)
            .await
            .map_err(|source| StateSaveError::Write {
                path: tmp_path.clone(),
                source,
            })?;

        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|source| StateSaveError::Rename {
                path: path.clone(),
                source,
            })?;

        tracing::debug!("Wrote {} record(s) to {}", state.len(), path.display());
        Ok(())
    }
}

async fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await
}
