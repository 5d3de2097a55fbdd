//! # pin-sync
//!
//! Filesystem side of assetpin: finds asset bundles that have no recorded
//! content address for a namespace, publishes them to a [`ContentStore`],
//! and records the returned addresses in a per-namespace state file.
//!
//! ```text
//! <assets_root>/
//! ├── matty-1/{metadata.json, matty-1.jpg}
//! ├── matty-2/{metadata.json, matty-2.jpg}
//! └── data/
//!     └── <namespace>/
//!         ├── state.json      {"matty-1": {"uri": "ipfs://..."}}
//!         └── .lock
//! ```
//!
//! Components:
//! - [`StateStore`] - load/save `state.json`
//! - [`AssetScanner`] - list bundles, compute pending set
//! - [`Publisher`] - read a bundle, submit with timeout and retry
//! - [`SyncOrchestrator`] - bounded-concurrency run, serialized merges
//!
//! ## Example
//!
//! ```rust,ignore
//! use assetpin_content::MemoryStore;
//! use assetpin_sync::{SyncOrchestrator, SyncSettings};
//! use assetpin_types::Namespace;
//!
//! let settings = SyncSettings::new("assets", Namespace::new("localhost")?);
//! let report = SyncOrchestrator::new(settings, MemoryStore::new()).run().await?;
//! println!("{}", report.outcome());
//! ```
//!
//! [`ContentStore`]: pin_content::ContentStore

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bundle;
mod error;
mod lock;
mod orchestrator;
mod publisher;
mod scanner;
mod state_store;

pub use bundle::{media_type_for, AssetBundle, DEFAULT_MEDIA_TYPE, METADATA_FILE};
pub use error::{
    BundleReadError, LockError, PublishCause, PublishError, ScanError, StateLoadError,
    StateSaveError, SyncError,
};
pub use lock::{NamespaceLock, LOCK_FILE};
pub use orchestrator::{
    AssetStatus, SyncOrchestrator, SyncSettings, DEFAULT_CONCURRENCY, DEFAULT_STATE_DIR,
};
pub use publisher::{Publisher, DEFAULT_TIMEOUT};
pub use scanner::AssetScanner;
pub use state_store::{StateStore, CORRUPT_SUFFIX, STATE_FILE};
