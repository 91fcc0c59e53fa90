use serde::Deserialize;

use crate::core::{
    Card,
    CardDraft,
    CardId,
    Collection,
    StoreError,
};

pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

/// Raw persisted status label for one record, as the store holds it.
/// Surfaced only for the one-shot repair pass; steady-state reads go through
/// `list`, which maps labels onto the closed `Status` enum.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStatus {
    pub id: CardId,
    #[serde(default)]
    pub status: String,
}

/// Record store collaborator. Implementations assign ids on insert and
/// surface structured failures instead of panicking.
pub trait CardStore {
    /// All cards of a collection, in whatever order the backing store
    /// returns them.
    fn list(&self, collection: Collection) -> Result<Vec<Card>, StoreError>;

    /// Inserts a new card and returns it with its assigned id. The target
    /// collection follows from the draft's content variant.
    fn insert(&self, draft: CardDraft) -> Result<Card, StoreError>;

    /// Overwrites the record with the card's id, all fields verbatim.
    fn update(&self, card: &Card) -> Result<(), StoreError>;

    fn delete(&self, collection: Collection, id: CardId) -> Result<(), StoreError>;

    /// Raw status labels of every record in the collection.
    fn raw_statuses(&self, collection: Collection) -> Result<Vec<RawStatus>, StoreError>;
}
