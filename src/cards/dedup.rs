use std::collections::HashSet;

use crate::{
    core::{
        CairnError,
        CardId,
        Collection,
        StoreError,
    },
    store::CardStore,
};

#[derive(Debug, Default)]
pub struct DedupReport {
    /// Duplicates successfully deleted.
    pub removed: usize,
    /// Cards with an empty identity key, left untouched.
    pub skipped: Vec<CardId>,
    /// Duplicates whose deletion failed; these stay in the store.
    pub failed: Vec<(CardId, StoreError)>,
}

/// Deletes every card whose identity key was already seen earlier in store
/// order, keeping the first occurrence of each key. Cards without an
/// identity key are reported and never deleted. A delete failure is recorded
/// and does not stop the pass.
pub fn dedup(store: &impl CardStore, collection: Collection) -> Result<DedupReport, CairnError> {
    let cards = store.list(collection)?;

    let mut seen = HashSet::new();
    let mut keep = HashSet::new();
    let mut report = DedupReport::default();

    for card in &cards {
        match card.identity_key() {
            None => report.skipped.push(card.id),
            Some(key) => {
                if seen.insert(key) {
                    keep.insert(card.id);
                }
            }
        }
    }

    for card in &cards {
        if card.identity_key().is_none() || keep.contains(&card.id) {
            continue;
        }
        match store.delete(collection, card.id) {
            Ok(()) => report.removed += 1,
            Err(e) => report.failed.push((card.id, e)),
        }
    }

    Ok(report)
}
