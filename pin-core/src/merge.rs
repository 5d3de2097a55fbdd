//! Folding a fresh content address into publication state.
//!
//! The merge is additive: the new record starts with `uri`, followed by every
//! field the previous record carried (token ids, notes, ...). Only `uri` is
//! taken from the publish result.

use pin_types::{AssetId, ContentAddress, PublicationRecord, PublicationState, URI_FIELD};
use serde_json::{Map, Value};

/// What a merge did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No record existed; a new one was created.
    Inserted,
    /// An unpublished record was given its `uri`.
    Updated,
    /// The record already had a `uri`; nothing was changed.
    AlreadyPublished,
}

impl MergeOutcome {
    /// Whether the state was modified.
    pub fn changed(self) -> bool {
        !matches!(self, MergeOutcome::AlreadyPublished)
    }
}

/// Record `address` as the `uri` of `id`, keeping all other fields.
///
/// A record that is already published is left untouched: a later run must
/// never replace an existing `uri`.
pub fn merge_published(
    state: &mut PublicationState,
    id: &AssetId,
    address: &ContentAddress,
) -> MergeOutcome {
    let previous = match state.get(id) {
        Some(record) if record.is_published() => return MergeOutcome::AlreadyPublished,
        Some(record) => Some(record.clone()),
        None => None,
    };

    let mut fields = Map::new();
    fields.insert(URI_FIELD.to_string(), Value::String(address.to_string()));

    let outcome = match previous {
        Some(record) => {
            fields.extend(
                record
                    .into_fields()
                    .into_iter()
                    .filter(|(key, _)| key != URI_FIELD),
            );
            MergeOutcome::Updated
        }
        None => MergeOutcome::Inserted,
    };

    state.insert(id.clone(), PublicationRecord::from_fields(fields));
    outcome
}
