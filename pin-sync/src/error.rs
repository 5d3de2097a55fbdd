//! Error types for pin-sync.
//!
//! Errors fall in three groups:
//! - non-fatal: [`StateLoadError`] degrades to empty state
//! - per-asset: [`BundleReadError`], [`PublishError`] skip one asset
//! - run-level: [`SyncError`] ends the run

use std::path::PathBuf;
use std::time::Duration;

use pin_content::ContentError;
use pin_core::SyncReport;
use pin_types::AssetId;
use thiserror::Error;

/// Failure to read the persisted state. Never fatal.
#[derive(Debug, Error)]
pub enum StateLoadError {
    /// No state file yet (fresh namespace).
    #[error("no state file at {path}")]
    NotFound {
        /// Expected state file path.
        path: PathBuf,
    },

    /// State file exists but could not be read.
    #[error("failed to read state file {path}: {source}")]
    Read {
        /// State file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// State file is not an object of record objects.
    #[error("failed to parse state file {path}: {source}")]
    Parse {
        /// State file path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// Failure to persist state. Fatal: uploads would otherwise be forgotten.
#[derive(Debug, Error)]
pub enum StateSaveError {
    /// Namespace directory could not be created.
    #[error("failed to create state directory {path}: {source}")]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// State could not be serialized.
    #[error("failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Temporary file could not be written.
    #[error("failed to write state file {path}: {source}")]
    Write {
        /// Temporary file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Unreadable state file could not be moved aside.
    #[error("failed to move unreadable state file {path} aside: {source}")]
    SetAside {
        /// State file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Temporary file could not be moved into place.
    #[error("failed to replace state file {path}: {source}")]
    Rename {
        /// State file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Failure to enumerate the assets root.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Assets root could not be listed.
    #[error("failed to read assets directory {path}: {source}")]
    ReadDir {
        /// Assets root.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Failure to load one asset bundle. Skips that asset only.
#[derive(Debug, Error)]
pub enum BundleReadError {
    /// `metadata.json` does not exist.
    #[error("metadata file {path} not found")]
    MissingMetadata {
        /// The asset.
        asset: AssetId,
        /// Expected metadata path.
        path: PathBuf,
    },

    /// A bundle file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The asset.
        asset: AssetId,
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// `metadata.json` is not a JSON object.
    #[error("invalid metadata {path}: {source}")]
    Parse {
        /// The asset.
        asset: AssetId,
        /// Metadata path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Metadata has no usable `image` field.
    #[error("metadata has no \"image\" field")]
    MissingImageField {
        /// The asset.
        asset: AssetId,
    },

    /// `image` names something outside the bundle directory.
    #[error("image {image:?} must be a file name inside the bundle directory")]
    InvalidImagePath {
        /// The asset.
        asset: AssetId,
        /// The offending `image` value.
        image: String,
    },

    /// The file named by `image` does not exist.
    #[error("image file {path} not found")]
    MissingPayload {
        /// The asset.
        asset: AssetId,
        /// Expected payload path.
        path: PathBuf,
    },
}

impl BundleReadError {
    /// The asset this error belongs to.
    pub fn asset(&self) -> &AssetId {
        match self {
            BundleReadError::MissingMetadata { asset, .. }
            | BundleReadError::Read { asset, .. }
            | BundleReadError::Parse { asset, .. }
            | BundleReadError::MissingImageField { asset }
            | BundleReadError::InvalidImagePath { asset, .. }
            | BundleReadError::MissingPayload { asset, .. } => asset,
        }
    }
}

/// Why the last publish attempt failed.
#[derive(Debug, Error)]
pub enum PublishCause {
    /// The store did not answer in time.
    #[error("store did not answer within {0:?}")]
    Timeout(Duration),

    /// The store answered with an error.
    #[error(transparent)]
    Store(#[from] ContentError),
}

impl PublishCause {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            PublishCause::Timeout(_) => true,
            PublishCause::Store(e) => e.is_retryable(),
        }
    }
}

/// Failure to publish one asset. Skips that asset only.
#[derive(Debug, Error)]
#[error("publish failed after {attempts} attempt(s): {cause}")]
pub struct PublishError {
    /// The asset.
    pub asset: AssetId,
    /// Attempts made.
    pub attempts: u32,
    /// Cause of the last failed attempt.
    #[source]
    pub cause: PublishCause,
}

/// Failure to take the per-namespace lock.
#[derive(Debug, Error)]
pub enum LockError {
    /// Lock file could not be created or opened.
    #[error("failed to open lock file {path}: {source}")]
    Open {
        /// Lock file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Another run holds the lock.
    #[error("another run is in progress for this namespace (lock held on {path})")]
    Locked {
        /// Lock file path.
        path: PathBuf,
    },
}

/// Run-level errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Namespace lock could not be taken.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// Assets root could not be scanned.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// State could not be saved after uploads succeeded.
    ///
    /// `report` lists the assets that were uploaded but whose addresses are
    /// not on disk, so they can be recorded by hand.
    #[error(
        "{} asset(s) uploaded but state was not saved: {source}",
        .report.published.len()
    )]
    StateSave {
        /// What the run did before the failure.
        report: Box<SyncReport>,
        /// Underlying save error.
        source: StateSaveError,
    },
}

pub(crate) type Result<T, E = SyncError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> AssetId {
        AssetId::new(name).unwrap()
    }

    #[test]
    fn publish_error_display_leaves_asset_to_caller() {
        let err = PublishError {
            asset: id("matty-3"),
            attempts: 3,
            cause: PublishCause::Store(ContentError::Transport("connection reset".into())),
        };
        assert_eq!(
            err.to_string(),
            "publish failed after 3 attempt(s): transport error: connection reset"
        );
    }

    #[test]
    fn bundle_error_display_leaves_asset_to_caller() {
        let err = BundleReadError::MissingImageField { asset: id("matty-3") };
        assert_eq!(err.to_string(), "metadata has no \"image\" field");
    }

    #[test]
    fn bundle_error_exposes_asset() {
        let err = BundleReadError::MissingImageField { asset: id("x") };
        assert_eq!(err.asset(), &id("x"));
    }

    #[test]
    fn timeout_is_retryable() {
        assert!(PublishCause::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!PublishCause::Store(ContentError::Rejected("no".into())).is_retryable());
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncError>();
        assert_send_sync::<PublishError>();
        assert_send_sync::<BundleReadError>();
    }
}
