//! Content-addressed store abstraction.
//!
//! This module provides the trait every backend implements, the submission
//! type handed to it, and a memory-based implementation for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use pin_types::{AssetMetadata, ContentAddress};

use crate::error::ContentError;

/// One asset as handed to a store: metadata fields plus one payload file.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Asset id the submission was built from (used for logging and naming).
    pub name: String,
    /// Metadata fields, forwarded verbatim.
    pub metadata: AssetMetadata,
    /// File name of the payload, as referenced by the metadata `image` field.
    pub file_name: String,
    /// Media type of the payload, e.g. `image/png`.
    pub media_type: String,
    /// Payload bytes.
    pub payload: Vec<u8>,
}

/// Trait for content-addressed stores.
///
/// A store accepts a submission and returns the address under which the
/// metadata (with the payload linked from it) can be retrieved. Stores are
/// not expected to retry; callers own the retry policy.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a submission and return its content address.
    async fn store(&self, submission: &Submission) -> Result<ContentAddress, ContentError>;
}

#[async_trait]
impl<S: ContentStore + ?Sized> ContentStore for Arc<S> {
    async fn store(&self, submission: &Submission) -> Result<ContentAddress, ContentError> {
        (**self).store(submission).await
    }
}

/// In-memory content store.
///
/// Addresses are `ipfs://<blake3 hex>/metadata.json`, where the hash covers
/// the payload and the serialized metadata, so identical submissions map to
/// the same address. Not persistent - all data is lost when the store is dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Submission>>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the address a submission would be stored under.
    pub fn address_for(submission: &Submission) -> Result<ContentAddress, ContentError> {
        let meta = serde_json::to_vec(&submission.metadata)
            .map_err(|e| ContentError::InvalidSubmission(e.to_string()))?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(&meta);
        hasher.update(&submission.payload);
        let hash = hasher.finalize();
        ContentAddress::new(format!("ipfs://{}/metadata.json", hex::encode(hash.as_bytes())))
            .map_err(|e| ContentError::InvalidResponse(e.to_string()))
    }

    /// Get a stored submission by address.
    pub fn get(&self, address: &ContentAddress) -> Option<Submission> {
        self.lock().get(address.as_str()).cloned()
    }

    /// Names of all stored submissions, sorted.
    pub fn stored_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.lock().values().map(|s| s.name.clone()).collect();
        names.sort();
        names
    }

    /// Get the number of submissions currently stored.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clear all submissions from the store.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Submission>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn store(&self, submission: &Submission) -> Result<ContentAddress, ContentError> {
        let address = Self::address_for(submission)?;
        self.lock().insert(address.to_string(), submission.clone());
        Ok(address)
    }
}
