use crate::{
    core::{
        CairnError,
        CardId,
        Collection,
        Status,
        StoreError,
    },
    store::CardStore,
};

#[derive(Debug, Default)]
pub struct RepairReport {
    /// Records examined, healthy ones included.
    pub examined: usize,
    /// Records rewritten with a canonical status label.
    pub repaired: usize,
    pub failed: Vec<(CardId, StoreError)>,
}

/// One-shot migration for status labels written before the closed status
/// domain existed: empty strings, padded or decorated variants. Every record
/// whose persisted label is not byte-exact canonical is rewritten via
/// `Status::repair_label`. Not part of steady-state logic; reads already
/// tolerate bad labels by treating them as `Unreviewed`.
pub fn repair_statuses(
    store: &impl CardStore,
    collection: Collection,
) -> Result<RepairReport, CairnError> {
    let raw = store.raw_statuses(collection)?;

    let mut report = RepairReport { examined: raw.len(), ..Default::default() };
    let defects: Vec<(CardId, Status)> = raw
        .iter()
        .filter(|r| !Status::ALL.iter().any(|s| s.as_str() == r.status))
        .map(|r| (r.id, Status::repair_label(&r.status)))
        .collect();
    if defects.is_empty() {
        return Ok(report);
    }

    let cards = store.list(collection)?;
    for (id, status) in defects {
        let Some(card) = cards.iter().find(|c| c.id == id) else {
            // Deleted between the two reads; nothing left to repair.
            continue;
        };
        let mut card = card.clone();
        card.status = status;
        match store.update(&card) {
            Ok(()) => report.repaired += 1,
            Err(e) => report.failed.push((id, e)),
        }
    }
    Ok(report)
}
