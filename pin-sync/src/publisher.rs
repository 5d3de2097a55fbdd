//! Publishing bundles to a content store.
//!
//! Every submission is bounded by a timeout and retried according to a
//! [`RetryPolicy`]. Errors that will not go away on retry (rejected
//! metadata, 4xx responses) end the attempt loop immediately.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pin_content::ContentStore;
use pin_core::RetryPolicy;
use pin_types::{AssetId, ContentAddress};

use crate::bundle::AssetBundle;
use crate::error::{BundleReadError, PublishCause, PublishError};

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Loads bundles and submits them to a [`ContentStore`].
#[derive(Debug)]
pub struct Publisher<S> {
    store: S,
    assets_root: PathBuf,
    timeout: Duration,
    retry: RetryPolicy,
}

impl<S: ContentStore> Publisher<S> {
    /// Create a publisher reading bundles from `assets_root`.
    pub fn new(store: S, assets_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            assets_root: assets_root.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The assets root bundles are read from.
    pub fn assets_root(&self) -> &Path {
        &self.assets_root
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the bundle for `id`.
    pub async fn load_bundle(&self, id: &AssetId) -> Result<AssetBundle, BundleReadError> {
        AssetBundle::load(&self.assets_root, id).await
    }

    /// Submit `bundle` to the store and return its content address.
    pub async fn publish(&self, bundle: &AssetBundle) -> Result<ContentAddress, PublishError> {
        let submission = bundle.to_submission();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let cause = match tokio::time::timeout(self.timeout, self.store.store(&submission)).await
            {
                Ok(Ok(address)) => {
                    tracing::debug!(asset = %bundle.id, attempt, "Stored at {}", address);
                    return Ok(address);
                }
                Ok(Err(e)) => PublishCause::Store(e),
                Err(_) => PublishCause::Timeout(self.timeout),
            };

            if !cause.is_retryable() || !self.retry.should_retry(attempt) {
                return Err(PublishError {
                    asset: bundle.id.clone(),
                    attempts: attempt,
                    cause,
                });
            }

            let delay = self.retry.delay_for(attempt);
            tracing::warn!(
                asset = %bundle.id,
                attempt,
                "Store attempt failed ({}), retrying in {:?}",
                cause,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}
