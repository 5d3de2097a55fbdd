//! SyncOrchestrator - one synchronization run for one namespace.
//!
//! # Flow
//!
//! ```text
//! list_assets ─► StateStore::load ─► pending set ─► lock ─► reload
//!                                                             │
//!              ┌──────────────────────────────────┴─────┐
//!              ▼  (at most `concurrency` at a time)      ▼
//!   load_bundle + publish(a)            ...   load_bundle + publish(z)
//!              │                                         │
//!              └──────────► merge + save, one by one ◄───┘
//! ```
//!
//! Publish tasks never touch the state. Each yields `(asset, result)` and
//! the orchestrator loop alone merges results and flushes the state file
//! after every success, so an interrupted run keeps what it already merged.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use pin_content::ContentStore;
use pin_core::{merge_published, pending_assets, FailureStage, RetryPolicy, SyncReport};
use pin_types::{AssetId, ContentAddress, Namespace, PublicationState};

use crate::error::{Result, ScanError, StateLoadError, StateSaveError, SyncError};
use crate::lock::NamespaceLock;
use crate::publisher::{Publisher, DEFAULT_TIMEOUT};
use crate::scanner::AssetScanner;
use crate::state_store::StateStore;

/// Default state directory name under the assets root.
pub const DEFAULT_STATE_DIR: &str = "data";

/// Default number of concurrent store submissions.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Settings for one synchronizer.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Directory holding one subdirectory per asset bundle.
    pub assets_root: PathBuf,
    /// Directory holding one subdirectory per namespace.
    pub state_root: PathBuf,
    /// Namespace (network) whose state is synchronized.
    pub namespace: Namespace,
    /// Maximum concurrent store submissions (at least 1).
    pub concurrency: usize,
    /// Per-attempt store timeout.
    pub timeout: Duration,
    /// Retry policy for store submissions.
    pub retry: RetryPolicy,
    /// Report pending assets without publishing or saving.
    pub dry_run: bool,
}

impl SyncSettings {
    /// Settings with defaults: state under `<assets_root>/data`.
    pub fn new(assets_root: impl Into<PathBuf>, namespace: Namespace) -> Self {
        let assets_root = assets_root.into();
        Self {
            state_root: assets_root.join(DEFAULT_STATE_DIR),
            assets_root,
            namespace,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            dry_run: false,
        }
    }
}

/// Publication status of one asset, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetStatus {
    /// The asset.
    pub id: AssetId,
    /// Recorded `uri`, if published.
    pub uri: Option<String>,
    /// Whether the bundle directory exists.
    pub on_disk: bool,
}

impl AssetStatus {
    /// Whether the asset has a recorded address.
    pub fn is_published(&self) -> bool {
        self.uri.is_some()
    }
}

/// Coordinates scanning, publishing and state persistence for one namespace.
#[derive(Debug)]
pub struct SyncOrchestrator<S> {
    settings: SyncSettings,
    state_store: StateStore,
    scanner: AssetScanner,
    publisher: Publisher<S>,
}

impl<S: ContentStore> SyncOrchestrator<S> {
    /// Build an orchestrator publishing to `store`.
    ///
    /// When the state root lives inside the assets root, its top directory
    /// is excluded from scanning.
    pub fn new(settings: SyncSettings, store: S) -> Self {
        let mut scanner = AssetScanner::new(&settings.assets_root);
        if let Some(name) = state_dir_name(&settings.assets_root, &settings.state_root) {
            scanner = scanner.exclude(name);
        }

        let publisher = Publisher::new(store, &settings.assets_root)
            .with_timeout(settings.timeout)
            .with_retry(settings.retry);

        Self {
            state_store: StateStore::new(&settings.state_root),
            scanner,
            publisher,
            settings,
        }
    }

    /// The settings in use.
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// The state store in use.
    pub fn state_store(&self) -> &StateStore {
        &self.state_store
    }

    /// The publisher in use.
    pub fn publisher(&self) -> &Publisher<S> {
        &self.publisher
    }

    /// Assets that would be published by [`run`](Self::run).
    pub async fn pending(&self) -> Result<Vec<AssetId>, ScanError> {
        let state = self.state_store.load(&self.settings.namespace).await;
        self.scanner.find_pending(&state).await
    }

    /// Every asset on disk or in state, with its publication status.
    pub async fn status(&self) -> Result<Vec<AssetStatus>, ScanError> {
        let state = self.state_store.load(&self.settings.namespace).await;
        let on_disk = self.scanner.list_assets().await?;

        let mut statuses: Vec<AssetStatus> = on_disk
            .iter()
            .map(|id| AssetStatus {
                id: id.clone(),
                uri: published_uri(&state, id),
                on_disk: true,
            })
            .collect();
        statuses.extend(
            state
                .iter()
                .filter(|(id, _)| on_disk.binary_search(id).is_err())
                .map(|(id, _)| AssetStatus {
                    id: id.clone(),
                    uri: published_uri(&state, id),
                    on_disk: false,
                }),
        );
        statuses.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(statuses)
    }

    /// Run one synchronization.
    ///
    /// Returns the report on success, no-op and partial success alike; check
    /// [`SyncReport::outcome`]. Fails only if the namespace is locked, the
    /// assets root cannot be scanned, or state cannot be saved after an upload.
    pub async fn run(&self) -> Result<SyncReport> {
        let namespace = &self.settings.namespace;
        let assets = self.scanner.list_assets().await?;

        // No-op and dry runs only read, so they take no lock and create nothing.
        let pending = pending_assets(assets.clone(), &self.state_store.load(namespace).await);
        if pending.is_empty() {
            tracing::info!(namespace = %namespace, "No new asset to be stored, skipped");
            return Ok(SyncReport::new(pending));
        }
        if self.settings.dry_run {
            tracing::info!(
                namespace = %namespace,
                "Dry run: {} asset(s) pending",
                pending.len()
            );
            let mut report = SyncReport::new(pending);
            report.dry_run = true;
            return Ok(report);
        }

        let _lock = NamespaceLock::acquire(&self.state_store.namespace_dir(namespace))?;

        // Reload under the lock; another run may have finished in between.
        // Load errors were already logged by the read above.
        let (mut state, mut unreadable) = match self.state_store.try_load(namespace).await {
            Ok(state) => (state, false),
            Err(StateLoadError::NotFound { .. }) => (PublicationState::new(), false),
            Err(_) => (PublicationState::new(), true),
        };
        let pending = pending_assets(assets, &state);
        let mut report = SyncReport::new(pending.clone());
        if pending.is_empty() {
            tracing::info!(namespace = %namespace, "No new asset to be stored, skipped");
            return Ok(report);
        }

        let concurrency = self.settings.concurrency.max(1);
        tracing::info!(
            namespace = %namespace,
            concurrency,
            "Storing {} new asset(s)",
            pending.len()
        );

        let mut results = stream::iter(pending)
            .map(|id| self.publish_one(id))
            .buffer_unordered(concurrency);

        while let Some((id, result)) = results.next().await {
            match result {
                Ok(address) => {
                    if !merge_published(&mut state, &id, &address).changed() {
                        tracing::warn!(asset = %id, "Already published, keeping recorded uri");
                        continue;
                    }
                    report.record_published(id, address);

                    if let Err(source) = self.persist(&state, &mut unreadable).await {
                        tracing::error!(
                            "Failed to save state to {}: {}",
                            self.state_store.state_path(namespace).display(),
                            source
                        );
                        report.sort();
                        return Err(SyncError::StateSave {
                            report: Box::new(report),
                            source,
                        });
                    }
                }
                Err((stage, reason)) => {
                    tracing::warn!(asset = %id, stage = %stage, "Failed to store asset: {}", reason);
                    report.record_failure(id, stage, reason);
                }
            }
        }

        report.sort();
        tracing::info!(namespace = %namespace, "Done: {}", report.outcome());
        Ok(report)
    }

    /// Save `state`, first moving an unreadable state file out of the way.
    async fn persist(
        &self,
        state: &PublicationState,
        unreadable: &mut bool,
    ) -> std::result::Result<(), StateSaveError> {
        let namespace = &self.settings.namespace;
        if *unreadable {
            self.state_store.set_aside(namespace).await?;
            *unreadable = false;
        }
        self.state_store.save(namespace, state).await
    }

    /// Load and publish one asset. Never touches state.
    async fn publish_one(&self, id: AssetId) -> (AssetId, PublishResult) {
        let bundle = match self.publisher.load_bundle(&id).await {
            Ok(bundle) => bundle,
            Err(e) => return (id, Err((FailureStage::Bundle, e.to_string()))),
        };

        tracing::info!(asset = %id, "Storing asset {}...", id);
        match self.publisher.publish(&bundle).await {
            Ok(address) => (id, Ok(address)),
            Err(e) => (id, Err((FailureStage::Publish, e.to_string()))),
        }
    }
}

/// Address on success, failing stage and reason otherwise.
type PublishResult = std::result::Result<ContentAddress, (FailureStage, String)>;

fn published_uri(state: &PublicationState, id: &AssetId) -> Option<String> {
    state
        .get(id)
        .filter(|record| record.is_published())
        .and_then(|record| record.uri())
        .map(str::to_string)
}

/// Top directory of the state root when it lives inside the assets root.
fn state_dir_name(assets_root: &Path, state_root: &Path) -> Option<String> {
    match state_root.strip_prefix(assets_root).ok()?.components().next()? {
        Component::Normal(name) => name.to_str().map(str::to_string),
        _ => None,
    }
}
