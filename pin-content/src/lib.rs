//! # pin-content
//!
//! Content-addressed storage backends for assetpin.
//!
//! An asset is submitted as a [`Submission`] (metadata fields plus one binary
//! payload tagged with its media type). The store answers with a
//! [`ContentAddress`](pin_types::ContentAddress) such as
//! `ipfs://bafy.../metadata.json`.
//!
//! ```text
//! metadata.json ─┐
//!                ├─► Submission ─► ContentStore::store ─► ContentAddress
//! image.jpg ─────┘
//! ```
//!
//! Backends:
//! - [`HttpStore`] - NFT.storage-style pinning API (`POST /store`, multipart)
//! - [`MemoryStore`] - in-process, BLAKE3-addressed; for tests and `--mock` runs
//! - [`ScriptedStore`] - wraps `MemoryStore` with injectable failures and delays
//!
//! ## Example
//!
//! ```rust,ignore
//! use assetpin_content::{ContentStore, MemoryStore, Submission};
//!
//! let store = MemoryStore::new();
//! let address = store.store(&submission).await?;
//! println!("stored at {address}");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod http;
mod mock;
mod store;

pub use error::ContentError;
pub use http::{HttpStore, HttpStoreConfig, DEFAULT_ENDPOINT};
pub use mock::ScriptedStore;
pub use store::{ContentStore, MemoryStore, Submission};
