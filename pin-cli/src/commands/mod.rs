//! CLI command implementations.

pub mod pending;
pub mod status;
pub mod store;

use std::sync::Arc;

use pin_content::{ContentStore, HttpStore, MemoryStore};
use pin_sync::{SyncOrchestrator, SyncSettings};

use crate::config::Config;

/// Store backend chosen at startup.
pub type DynStore = Arc<dyn ContentStore>;

/// Directory under the state root that holds `--mock` state.
pub const MOCK_STATE_DIR: &str = ".mock";

/// Build a synchronizer backed by the pinning service, or by an in-memory
/// store when `mock` is set.
///
/// Mock runs keep their state under [`MOCK_STATE_DIR`] so fake addresses
/// never land in the real state file.
pub fn orchestrator(
    mut settings: SyncSettings,
    config: &Config,
    mock: bool,
) -> SyncOrchestrator<DynStore> {
    let store: DynStore = if mock {
        settings.state_root = settings.state_root.join(MOCK_STATE_DIR);
        tracing::info!(
            "Using in-memory store (--mock), state kept in {}",
            settings.state_root.display()
        );
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(HttpStore::new(config.http_store_config()))
    };
    SyncOrchestrator::new(settings, store)
}
