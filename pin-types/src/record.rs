//! Publication records and per-network publication state.
//!
//! The state file is a JSON object mapping asset id to record object:
//!
//! ```json
//! {
//!   "matty-1": { "uri": "ipfs://bafy.../metadata.json", "tokenId": 1 },
//!   "matty-2": { "note": "waiting for artwork" }
//! }
//! ```
//!
//! Records are kept as raw JSON objects so that fields written by other
//! tools (token ids, notes) survive a load/save cycle byte-for-byte.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::btree_map::{self, BTreeMap};

use crate::ids::{AssetId, ContentAddress};

/// Record field holding the content address.
pub const URI_FIELD: &str = "uri";

/// What is known about one asset's publication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicationRecord(Map<String, Value>);

impl PublicationRecord {
    /// Create an empty record (not published).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record holding only a content address.
    pub fn published(address: &ContentAddress) -> Self {
        let mut fields = Map::new();
        fields.insert(URI_FIELD.to_string(), Value::String(address.to_string()));
        Self(fields)
    }

    /// Wrap an existing JSON object.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The recorded `uri`, if it is a string.
    pub fn uri(&self) -> Option<&str> {
        self.0.get(URI_FIELD).and_then(Value::as_str)
    }

    /// Whether this record has a non-empty `uri`.
    ///
    /// A published record must never be uploaded again.
    pub fn is_published(&self) -> bool {
        self.uri().is_some_and(|uri| !uri.trim().is_empty())
    }

    /// Get a field by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// All fields, in their stored order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying JSON object.
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

/// Mapping from asset id to publication record for one namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicationState {
    records: BTreeMap<AssetId, PublicationRecord>,
}

impl PublicationState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the record for an asset.
    pub fn get(&self, id: &AssetId) -> Option<&PublicationRecord> {
        self.records.get(id)
    }

    /// Whether the asset has a recorded, non-empty `uri`.
    pub fn is_published(&self, id: &AssetId) -> bool {
        self.records
            .get(id)
            .is_some_and(PublicationRecord::is_published)
    }

    /// Insert or replace a record, returning the previous one.
    pub fn insert(&mut self, id: AssetId, record: PublicationRecord) -> Option<PublicationRecord> {
        self.records.insert(id, record)
    }

    /// Remove the record for an asset.
    pub fn remove(&mut self, id: &AssetId) -> Option<PublicationRecord> {
        self.records.remove(id)
    }

    /// Number of records (published or not).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of published records.
    pub fn published_count(&self) -> usize {
        self.records.values().filter(|r| r.is_published()).count()
    }

    /// Iterate over records in asset id order.
    pub fn iter(&self) -> btree_map::Iter<'_, AssetId, PublicationRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a PublicationState {
    type Item = (&'a AssetId, &'a PublicationRecord);
    type IntoIter = btree_map::Iter<'a, AssetId, PublicationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<(AssetId, PublicationRecord)> for PublicationState {
    fn from_iter<T: IntoIterator<Item = (AssetId, PublicationRecord)>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> AssetId {
        AssetId::new(name).unwrap()
    }

    #[test]
    fn record_published_only_with_non_empty_uri() {
        let parse = |json: &str| serde_json::from_str::<PublicationRecord>(json).unwrap();

        assert!(parse(r#"{"uri":"ipfs://X"}"#).is_published());
        assert!(!parse(r#"{}"#).is_published());
        assert!(!parse(r#"{"uri":""}"#).is_published());
        assert!(!parse(r#"{"uri":"   "}"#).is_published());
        assert!(!parse(r#"{"uri":null}"#).is_published());
        assert!(!parse(r#"{"uri":42}"#).is_published());
    }

    #[test]
    fn state_roundtrip_preserves_unrelated_fields() {
        let json = r#"{"a":{"uri":"ipfs://A","tokenId":1,"tags":["x"]},"b":{"note":"later","uri":null}}"#;
        let state: PublicationState = serde_json::from_str(json).unwrap();

        assert_eq!(state.len(), 2);
        assert!(state.is_published(&id("a")));
        assert!(!state.is_published(&id("b")));
        assert_eq!(state.published_count(), 1);
        assert_eq!(serde_json::to_string(&state).unwrap(), json);
    }

    #[test]
    fn state_rejects_non_object_records() {
        assert!(serde_json::from_str::<PublicationState>(r#"{"a":"ipfs://A"}"#).is_err());
        assert!(serde_json::from_str::<PublicationState>("[]").is_err());
    }

    #[test]
    fn state_iterates_in_id_order() {
        let state: PublicationState = [
            (id("zeta"), PublicationRecord::new()),
            (id("alpha"), PublicationRecord::new()),
        ]
        .into_iter()
        .collect();

        let ids: Vec<_> = state.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["alpha", "zeta"]);
    }

    #[test]
    fn published_record_has_only_uri() {
        let addr = ContentAddress::new("ipfs://Q").unwrap();
        let record = PublicationRecord::published(&addr);
        assert_eq!(record.uri(), Some("ipfs://Q"));
        assert_eq!(record.fields().len(), 1);
    }
}
