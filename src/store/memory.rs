use std::{
    collections::HashSet,
    sync::{
        Mutex,
        MutexGuard,
    },
};

use super::{
    CardStore,
    RawStatus,
};
use crate::core::{
    Card,
    CardDraft,
    CardId,
    Collection,
    StoreError,
};

/// In-process store with the same observable behavior as the REST adapter:
/// sequential id assignment, insertion order on list, lenient status reads.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

struct Row {
    card: Card,
    raw_status: String,
}

#[derive(Default)]
struct Table {
    rows: Vec<Row>,
    next_id: CardId,
}

#[derive(Default)]
struct Inner {
    vocabulary: Table,
    correction: Table,
    fail_deletes: HashSet<CardId>,
    fail_updates: HashSet<CardId>,
    fail_inserts: usize,
}

impl Inner {
    fn table(&mut self, collection: Collection) -> &mut Table {
        match collection {
            Collection::Vocabulary => &mut self.vocabulary,
            Collection::Correction => &mut self.correction,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore { inner: Mutex::new(Inner::default()) }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Plants a raw status label directly in storage, bypassing the enum.
    /// Mirrors legacy data written before the closed status domain existed.
    #[cfg(test)]
    pub fn set_raw_status(&self, collection: Collection, id: CardId, label: &str) {
        use crate::core::Status;

        let mut inner = self.lock();
        if let Some(row) = inner.table(collection).rows.iter_mut().find(|r| r.card.id == id) {
            row.raw_status = label.to_string();
            row.card.status = Status::from_label(label).unwrap_or_default();
        }
    }

    /// Makes every delete of the given ids fail until cleared.
    #[cfg(test)]
    pub fn fail_deletes(&self, ids: impl IntoIterator<Item = CardId>) {
        self.lock().fail_deletes = ids.into_iter().collect();
    }

    /// Makes every update of the given ids fail until cleared.
    #[cfg(test)]
    pub fn fail_updates(&self, ids: impl IntoIterator<Item = CardId>) {
        self.lock().fail_updates = ids.into_iter().collect();
    }

    /// Makes the next `count` inserts fail.
    #[cfg(test)]
    pub fn fail_inserts(&self, count: usize) {
        self.lock().fail_inserts = count;
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl CardStore for MemoryStore {
    fn list(&self, collection: Collection) -> Result<Vec<Card>, StoreError> {
        let mut inner = self.lock();
        Ok(inner.table(collection).rows.iter().map(|r| r.card.clone()).collect())
    }

    fn insert(&self, draft: CardDraft) -> Result<Card, StoreError> {
        let mut inner = self.lock();
        if inner.fail_inserts > 0 {
            inner.fail_inserts -= 1;
            return Err(StoreError::Custom("induced insert failure".to_string()));
        }
        let table = inner.table(draft.content.collection());
        table.next_id += 1;
        let card =
            Card { id: table.next_id, status: draft.status, date: draft.date, content: draft.content };
        table.rows.push(Row { raw_status: card.status.as_str().to_string(), card: card.clone() });
        Ok(card)
    }

    fn update(&self, card: &Card) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.fail_updates.contains(&card.id) {
            return Err(StoreError::Custom("induced update failure".to_string()));
        }
        let table = inner.table(card.collection());
        match table.rows.iter_mut().find(|r| r.card.id == card.id) {
            Some(row) => {
                row.card = card.clone();
                row.raw_status = card.status.as_str().to_string();
                Ok(())
            }
            None => Err(StoreError::Custom(format!(
                "no record {} in {}",
                card.id,
                card.collection().table()
            ))),
        }
    }

    fn delete(&self, collection: Collection, id: CardId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.fail_deletes.contains(&id) {
            return Err(StoreError::Custom("induced delete failure".to_string()));
        }
        let table = inner.table(collection);
        let before = table.rows.len();
        table.rows.retain(|r| r.card.id != id);
        if table.rows.len() == before {
            return Err(StoreError::Custom(format!("no record {} in {}", id, collection.table())));
        }
        Ok(())
    }

    fn raw_statuses(&self, collection: Collection) -> Result<Vec<RawStatus>, StoreError> {
        let mut inner = self.lock();
        Ok(inner
            .table(collection)
            .rows
            .iter()
            .map(|r| RawStatus { id: r.card.id, status: r.raw_status.clone() })
            .collect())
    }
}
