//! # pin-core
//!
//! Pure logic for assetpin. No I/O, no async - every decision the
//! synchronizer makes about state lives here so it can be tested instantly.
//!
//! - [`pending`] - which assets still need publishing
//! - [`merge`] - folding a fresh content address into a record
//! - [`retry`] - exponential backoff policy for store submissions
//! - [`report`] - per-run summary and outcome classification

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod merge;
pub mod pending;
pub mod report;
pub mod retry;

pub use merge::{merge_published, MergeOutcome};
pub use pending::{is_pending, pending_assets};
pub use report::{AssetFailure, FailureStage, Outcome, SyncReport};
pub use retry::RetryPolicy;
