//! Asset metadata descriptor (`metadata.json`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field naming the payload file inside the bundle directory.
const IMAGE_FIELD: &str = "image";

/// The `metadata.json` object of an asset bundle.
///
/// Holds arbitrary fields in their original order. Only `image` has meaning
/// to assetpin; everything else is forwarded to the store untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetMetadata(Map<String, Value>);

impl AssetMetadata {
    /// Wrap an already parsed JSON object.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Name of the payload file, if the `image` field is a non-empty string.
    pub fn image(&self) -> Option<&str> {
        self.0
            .get(IMAGE_FIELD)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// The `name` field, if present.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Get a field by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// All fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying JSON object.
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}
