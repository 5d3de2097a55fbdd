//! Pending-asset selection.

use pin_types::{AssetId, PublicationState};

/// An asset is pending if it has no record or its record has no `uri`.
pub fn is_pending(state: &PublicationState, id: &AssetId) -> bool {
    !state.is_published(id)
}

/// Filter candidates down to pending assets, sorted and de-duplicated.
pub fn pending_assets<I>(candidates: I, state: &PublicationState) -> Vec<AssetId>
where
    I: IntoIterator<Item = AssetId>,
{
    let mut pending: Vec<AssetId> = candidates
        .into_iter()
        .filter(|id| is_pending(state, id))
        .collect();
    pending.sort();
    pending.dedup();
    pending
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> AssetId {
        AssetId::new(name).unwrap()
    }

    fn state(json: &str) -> PublicationState {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn missing_record_is_pending() {
        assert!(is_pending(&PublicationState::new(), &id("a")));
    }

    #[test]
    fn record_without_uri_is_pending() {
        let s = state(r#"{"a":{"note":"x"},"b":{"uri":""},"c":{"uri":"ipfs://C"}}"#);
        assert!(is_pending(&s, &id("a")));
        assert!(is_pending(&s, &id("b")));
        assert!(!is_pending(&s, &id("c")));
    }

    #[test]
    fn pending_assets_sorted_and_filtered() {
        let s = state(r#"{"b":{"uri":"ipfs://X"}}"#);
        let pending = pending_assets(vec![id("c"), id("b"), id("a"), id("c")], &s);
        assert_eq!(pending, vec![id("a"), id("c")]);
    }
}
