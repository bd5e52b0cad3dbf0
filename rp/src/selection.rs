//! Selection store: the ordered set of chosen product ids
//!
//! Insertion order is display order in the selected-items panel. The list
//! is written to durable storage after every mutation; ids that no longer
//! resolve against the current catalog stay in storage and are skipped when
//! projecting.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Product, ProductId};
use crate::storage::{Storage, StorageError};

/// Storage key for the persisted selection (JSON array of id strings)
pub const SELECTION_KEY: &str = "selectedProductIds";

/// Owns the selected ids and keeps storage in step with them
pub struct SelectionStore {
    ids: Vec<ProductId>,
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionStore").field("ids", &self.ids).finish()
    }
}

impl SelectionStore {
    /// An empty selection that persists into `storage`
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            ids: Vec::new(),
            storage,
        }
    }

    /// Load the persisted selection; unreadable storage degrades to empty
    pub fn restore(storage: Arc<dyn Storage>) -> Self {
        debug!("SelectionStore::restore: called");
        let ids = match Self::read_persisted(storage.as_ref()) {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "Failed to restore selection, starting empty");
                Vec::new()
            }
        };

        let mut unique: Vec<ProductId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        info!("Restored {} selected product(s)", unique.len());
        Self { ids: unique, storage }
    }

    fn read_persisted(storage: &dyn Storage) -> Result<Vec<ProductId>, StorageError> {
        match storage.get(SELECTION_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Add the id if absent, remove it if present
    ///
    /// Returns true when the id is selected afterwards.
    pub fn toggle(&mut self, id: &ProductId) -> bool {
        debug!(%id, "SelectionStore::toggle: called");
        let selected = match self.ids.iter().position(|s| s == id) {
            Some(idx) => {
                self.ids.remove(idx);
                false
            }
            None => {
                self.ids.push(id.clone());
                true
            }
        };
        self.persist();
        selected
    }

    /// Deselect an id; returns false if it was not selected
    pub fn remove(&mut self, id: &ProductId) -> bool {
        debug!(%id, "SelectionStore::remove: called");
        let Some(idx) = self.ids.iter().position(|s| s == id) else {
            return false;
        };
        self.ids.remove(idx);
        self.persist();
        true
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.ids.contains(id)
    }

    /// Empty the selection and persist the empty list
    pub fn clear(&mut self) {
        debug!(count = self.ids.len(), "SelectionStore::clear: called");
        self.ids.clear();
        self.persist();
    }

    /// Selected ids in insertion order, including stale ones
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected products in selection order, skipping ids the catalog lacks
    pub fn resolve<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Product> {
        self.ids.iter().filter_map(|id| catalog.get(id)).collect()
    }

    /// Write the full list; failures are logged, never raised
    fn persist(&self) {
        if let Err(e) = self.try_persist() {
            warn!(error = %e, "Failed to persist selection");
        }
    }

    fn try_persist(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.ids)?;
        self.storage.set(SELECTION_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use proptest::prelude::*;

    fn id(raw: &str) -> ProductId {
        ProductId::new(raw)
    }

    fn product(raw_id: &str, name: &str) -> Product {
        Product {
            id: id(raw_id),
            name: name.to_string(),
            brand: String::new(),
            category: String::new(),
            description: String::new(),
            image: String::new(),
            price: None,
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut store = SelectionStore::new(Arc::new(MemoryStorage::new()));
        assert!(store.toggle(&id("1")));
        assert!(store.toggle(&id("2")));
        assert!(!store.toggle(&id("1")));
        assert_eq!(store.ids(), &[id("2")]);
    }

    #[test]
    fn test_every_mutation_persists() {
        let storage = MemoryStorage::new();
        let mut store = SelectionStore::new(Arc::new(storage.clone()));

        store.toggle(&id("3"));
        store.toggle(&id("1"));
        assert_eq!(storage.get(SELECTION_KEY).unwrap(), Some(r#"["3","1"]"#.to_string()));

        store.remove(&id("3"));
        assert_eq!(storage.get(SELECTION_KEY).unwrap(), Some(r#"["1"]"#.to_string()));

        store.clear();
        assert_eq!(storage.get(SELECTION_KEY).unwrap(), Some("[]".to_string()));
    }

    #[test]
    fn test_restore_reads_numeric_ids_and_drops_duplicates() {
        let storage = MemoryStorage::new();
        storage.set(SELECTION_KEY, r#"[1, "2", "1"]"#).unwrap();

        let store = SelectionStore::restore(Arc::new(storage));
        assert_eq!(store.ids(), &[id("1"), id("2")]);
    }

    #[test]
    fn test_restore_corrupt_value_degrades_to_empty() {
        let storage = MemoryStorage::new();
        storage.set(SELECTION_KEY, "{oops").unwrap();

        let store = SelectionStore::restore(Arc::new(storage));
        assert!(store.is_empty());
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut store = SelectionStore::new(Arc::new(MemoryStorage::read_only()));
        assert!(store.toggle(&id("1")));
        assert!(store.contains(&id("1")));
    }

    #[test]
    fn test_resolve_skips_stale_ids_but_keeps_them_stored() {
        let storage = MemoryStorage::new();
        let mut store = SelectionStore::new(Arc::new(storage.clone()));
        store.toggle(&id("9"));
        store.toggle(&id("1"));

        let catalog = Catalog::new(vec![product("1", "Cleanser"), product("2", "Toner")]);
        let names: Vec<&str> = store.resolve(&catalog).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Cleanser"]);
        assert_eq!(store.len(), 2);
        assert_eq!(storage.get(SELECTION_KEY).unwrap(), Some(r#"["9","1"]"#.to_string()));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = SelectionStore::new(Arc::new(MemoryStorage::new()));
        assert!(!store.remove(&id("1")));
    }

    proptest! {
        #[test]
        fn prop_membership_follows_toggle_parity(toggles in proptest::collection::vec(0u8..6, 0..60)) {
            let mut store = SelectionStore::new(Arc::new(MemoryStorage::new()));
            for t in &toggles {
                store.toggle(&ProductId::from(*t as u64));
            }

            for candidate in 0u8..6 {
                let count = toggles.iter().filter(|t| **t == candidate).count();
                prop_assert_eq!(store.contains(&ProductId::from(candidate as u64)), count % 2 == 1);
            }

            let mut seen = store.ids().to_vec();
            seen.sort();
            seen.dedup();
            prop_assert_eq!(seen.len(), store.len());
        }
    }
}
