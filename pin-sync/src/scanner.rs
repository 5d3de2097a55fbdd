//! Discovery of asset bundles on disk.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use pin_core::pending_assets;
use pin_types::{AssetId, PublicationState};

use crate::error::ScanError;

/// Lists asset bundle directories under an assets root.
///
/// Every immediate subdirectory is a candidate except hidden ones (leading
/// `.`) and explicitly excluded names such as the state directory.
#[derive(Debug, Clone)]
pub struct AssetScanner {
    root: PathBuf,
    excluded: BTreeSet<String>,
}

impl AssetScanner {
    /// Create a scanner over `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excluded: BTreeSet::new(),
        }
    }

    /// Skip a directory name when scanning.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excluded.insert(name.into());
        self
    }

    /// The assets root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All asset bundle directories, sorted by name.
    pub async fn list_assets(&self) -> Result<Vec<AssetId>, ScanError> {
        let read_err = |source| ScanError::ReadDir {
            path: self.root.clone(),
            source,
        };
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(read_err)?;

        let mut assets = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                tracing::debug!("Skipping non UTF-8 entry {:?}", file_name);
                continue;
            };
            if name.starts_with('.') || self.excluded.contains(name) {
                continue;
            }

            // Follows symlinks, so a linked bundle directory counts.
            match tokio::fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => continue,
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            }

            match AssetId::new(name) {
                Ok(id) => assets.push(id),
                Err(e) => tracing::debug!("Skipping {}: {}", name, e),
            }
        }

        assets.sort();
        Ok(assets)
    }

    /// Asset bundles that have no published record in `state`, sorted by name.
    pub async fn find_pending(&self, state: &PublicationState) -> Result<Vec<AssetId>, ScanError> {
        let assets = self.list_assets().await?;
        let total = assets.len();
        let pending = pending_assets(assets, state);
        tracing::debug!(
            "Found {} asset(s) under {}, {} pending",
            total,
            self.root.display(),
            pending.len()
        );
        Ok(pending)
    }
}
