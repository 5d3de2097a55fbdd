//! Identity types for assetpin.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;

/// Returns true if `name` can be used as a single path component.
fn is_plain_dir_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

/// Identifier of an asset bundle: the name of its directory under the assets root.
///
/// Deserialization is unchecked so that state files written by other tools
/// still load; [`AssetId::new`] validates.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Create an AssetId from a directory name.
    pub fn new(name: impl Into<String>) -> Result<Self, TypesError> {
        let name = name.into();
        if is_plain_dir_name(&name) {
            Ok(Self(name))
        } else {
            Err(TypesError::InvalidAssetId(name))
        }
    }

    /// Get the directory name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.0)
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A partition of publication state, one per deployment target
/// (`localhost`, `rinkeby`, `mainnet`, ...).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    /// Create a Namespace, rejecting names that are not a single path component.
    pub fn new(name: impl Into<String>) -> Result<Self, TypesError> {
        let name = name.into();
        if is_plain_dir_name(&name) {
            Ok(Self(name))
        } else {
            Err(TypesError::InvalidNamespace(name))
        }
    }

    /// Get the namespace name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Namespace {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({})", self.0)
    }
}

/// Address returned by a content-addressed store, e.g. `ipfs://bafy.../metadata.json`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Create a ContentAddress. Surrounding whitespace is trimmed.
    pub fn new(uri: impl Into<String>) -> Result<Self, TypesError> {
        let uri = uri.into();
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyAddress);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the address as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The URI scheme, if the address has one (`ipfs`, `https`, ...).
    pub fn scheme(&self) -> Option<&str> {
        self.0.split_once("://").map(|(scheme, _)| scheme)
    }
}

impl TryFrom<String> for ContentAddress {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentAddress> for String {
    fn from(addr: ContentAddress) -> Self {
        addr.0
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentAddress({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_id_accepts_directory_names() {
        assert!(AssetId::new("avatar-001").is_ok());
        assert!(AssetId::new("Dragon Egg").is_ok());
    }

    #[test]
    fn asset_id_rejects_path_like_names() {
        for bad in ["", ".", "..", "a/b", "a\\b"] {
            assert_eq!(
                AssetId::new(bad),
                Err(TypesError::InvalidAssetId(bad.to_string()))
            );
        }
    }

    #[test]
    fn asset_ids_order_lexicographically() {
        let mut ids = vec![
            AssetId::new("b").unwrap(),
            AssetId::new("a10").unwrap(),
            AssetId::new("a2").unwrap(),
        ];
        ids.sort();
        let names: Vec<_> = ids.iter().map(AssetId::as_str).collect();
        assert_eq!(names, ["a10", "a2", "b"]);
    }

    #[test]
    fn namespace_rejects_traversal() {
        assert!(Namespace::new("rinkeby").is_ok());
        assert!(Namespace::new("..").is_err());
        assert!(Namespace::new("../etc").is_err());
    }

    #[test]
    fn namespace_deserialize_validates() {
        let ok: Namespace = serde_json::from_str("\"mainnet\"").unwrap();
        assert_eq!(ok.as_str(), "mainnet");
        assert!(serde_json::from_str::<Namespace>("\"a/b\"").is_err());
    }

    #[test]
    fn content_address_trims_and_rejects_empty() {
        let addr = ContentAddress::new("  ipfs://bafy/metadata.json\n").unwrap();
        assert_eq!(addr.as_str(), "ipfs://bafy/metadata.json");
        assert_eq!(addr.scheme(), Some("ipfs"));
        assert_eq!(ContentAddress::new("   "), Err(TypesError::EmptyAddress));
    }
}
