use crate::{
    core::{
        CairnError,
        Card,
        Collection,
        Status,
    },
    store::CardStore,
};

pub mod dedup;
pub mod export;
pub mod import;
pub mod push;
pub mod repair;

pub use dedup::{
    dedup,
    DedupReport,
};
pub use export::export_csv;
pub use import::{
    import,
    read_rows,
    ImportReport,
    Row,
};
pub use push::{
    push_pending,
    PushReport,
};
pub use repair::{
    repair_statuses,
    RepairReport,
};

/// Cards of a collection, optionally narrowed to one status.
pub fn list(
    store: &impl CardStore,
    collection: Collection,
    filter: Option<Status>,
) -> Result<Vec<Card>, CairnError> {
    let mut cards = store.list(collection)?;
    if let Some(status) = filter {
        cards.retain(|card| card.status == status);
    }
    Ok(cards)
}
