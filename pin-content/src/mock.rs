//! Scripted store for testing.
//!
//! Wraps a [`MemoryStore`] and lets tests inject failures, hangs and delays
//! per submission name, while recording how often each name was submitted and
//! how many submissions were in flight at once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use pin_types::ContentAddress;

use crate::error::ContentError;
use crate::store::{ContentStore, MemoryStore, Submission};

#[derive(Debug, Clone)]
enum Script {
    /// Fail every time.
    Fail(ContentError),
    /// Fail the next `n` submissions, then succeed.
    FailTimes(usize, ContentError),
    /// Never answer.
    Hang,
}

#[derive(Debug, Default)]
struct ScriptedInner {
    scripts: HashMap<String, Script>,
    calls: HashMap<String, usize>,
}

/// Test store with per-name failure injection.
#[derive(Debug, Clone, Default)]
pub struct ScriptedStore {
    backing: MemoryStore,
    inner: Arc<Mutex<ScriptedInner>>,
    delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl ScriptedStore {
    /// Create a scripted store that succeeds for every name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every submission by `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make every submission named `name` fail with `error`.
    pub fn fail(&self, name: &str, error: ContentError) {
        self.lock()
            .scripts
            .insert(name.to_string(), Script::Fail(error));
    }

    /// Make the next `times` submissions named `name` fail with `error`.
    pub fn fail_times(&self, name: &str, times: usize, error: ContentError) {
        self.lock()
            .scripts
            .insert(name.to_string(), Script::FailTimes(times, error));
    }

    /// Make submissions named `name` never complete.
    pub fn hang(&self, name: &str) {
        self.lock().scripts.insert(name.to_string(), Script::Hang);
    }

    /// Number of times `name` was submitted (including failed attempts).
    pub fn calls(&self, name: &str) -> usize {
        self.lock().calls.get(name).copied().unwrap_or(0)
    }

    /// Total number of submissions across all names.
    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// Highest number of submissions observed in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// The memory store holding successful submissions.
    pub fn backing(&self) -> &MemoryStore {
        &self.backing
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and decide the scripted answer, if any.
    fn next_script(&self, name: &str) -> Option<Script> {
        let mut inner = self.lock();
        *inner.calls.entry(name.to_string()).or_default() += 1;

        match inner.scripts.get_mut(name) {
            Some(Script::FailTimes(remaining, error)) => {
                if *remaining == 0 {
                    None
                } else {
                    *remaining -= 1;
                    Some(Script::Fail(error.clone()))
                }
            }
            Some(script) => Some(script.clone()),
            None => None,
        }
    }
}

/// Decrements the in-flight counter when a submission finishes or is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentStore for ScriptedStore {
    async fn store(&self, submission: &Submission) -> Result<ContentAddress, ContentError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let script = self.next_script(&submission.name);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match script {
            Some(Script::Fail(error)) | Some(Script::FailTimes(_, error)) => Err(error),
            Some(Script::Hang) => std::future::pending().await,
            None => self.backing.store(submission).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::submission;

    #[tokio::test]
    async fn succeeds_by_default() {
        let store = ScriptedStore::new();
        store.store(&submission("a", b"a")).await.unwrap();

        assert_eq!(store.calls("a"), 1);
        assert_eq!(store.backing().len(), 1);
    }

    #[tokio::test]
    async fn fail_times_then_succeed() {
        let store = ScriptedStore::new();
        store.fail_times("a", 2, ContentError::Transport("reset".into()));
        let sub = submission("a", b"a");

        assert!(store.store(&sub).await.is_err());
        assert!(store.store(&sub).await.is_err());
        assert!(store.store(&sub).await.is_ok());
        assert_eq!(store.calls("a"), 3);
    }

    #[tokio::test]
    async fn fail_always() {
        let store = ScriptedStore::new();
        store.fail("a", ContentError::Rejected("no".into()));

        for _ in 0..3 {
            let err = store.store(&submission("a", b"a")).await.unwrap_err();
            assert_eq!(err, ContentError::Rejected("no".into()));
        }
        assert!(store.backing().is_empty());
    }

    #[tokio::test]
    async fn hang_never_completes() {
        let store = ScriptedStore::new();
        store.hang("slow");

        let result = tokio::time::timeout(
            Duration::from_millis(20),
            store.store(&submission("slow", b"s")),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(store.calls("slow"), 1);
    }
}
