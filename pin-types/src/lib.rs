//! # pin-types
//!
//! Data model shared by all assetpin crates:
//! - [`AssetId`], [`Namespace`], [`ContentAddress`] - identity types
//! - [`AssetMetadata`] - the `metadata.json` descriptor of an asset bundle
//! - [`PublicationRecord`], [`PublicationState`] - what has been published, per network
//! - [`TypesError`] - validation errors

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod metadata;
mod record;

pub use error::TypesError;
pub use ids::{AssetId, ContentAddress, Namespace};
pub use metadata::AssetMetadata;
pub use record::{PublicationRecord, PublicationState, URI_FIELD};
