//! Shared catalog handle
//!
//! One [`CatalogStore`] is shared by every consumer in a process. The catalog
//! is swapped in whole when a new version arrives; readers keep whatever
//! [`Arc<Catalog>`] they already hold, so a rebuild never disturbs a
//! computation in flight.

use std::sync::{Arc, PoisonError, RwLock};

use crate::hash::ItemHash;
use crate::manifest::{Catalog, CatalogError, CatalogProvider};

#[derive(Debug, Default)]
pub struct CatalogStore {
    current: RwLock<Option<Arc<Catalog>>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `catalog`. Returns `false` if the same version is already
    /// loaded and nothing changed.
    pub fn populate(&self, catalog: Catalog) -> bool {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current
            .as_ref()
            .is_some_and(|c| c.version() == catalog.version())
        {
            tracing::debug!(version = catalog.version(), "catalog already loaded");
            return false;
        }
        tracing::info!(
            version = catalog.version(),
            definitions = catalog.len(),
            "catalog loaded"
        );
        *current = Some(Arc::new(catalog));
        true
    }

    /// Load every table from `provider` and install the result
    pub fn populate_from(&self, provider: &dyn CatalogProvider) -> Result<bool, CatalogError> {
        let catalog = Catalog::load(provider)?;
        Ok(self.populate(catalog))
    }

    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Snapshot of the loaded catalog
    pub fn current(&self) -> Option<Arc<Catalog>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }

    pub fn version(&self) -> Option<String> {
        self.current().map(|c| c.version().to_string())
    }

    /// Variant hashes of `hash`; just `[hash]` until a catalog is loaded
    pub fn variant_hashes(&self, hash: ItemHash) -> Vec<ItemHash> {
        match self.current() {
            Some(catalog) => catalog.variant_hashes(hash),
            None => vec![hash],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog(season: u32) -> Catalog {
        let items = json!({
            "1": { "hash": 1, "displayProperties": { "name": "Ace" }, "itemType": 3, "seasonHash": season },
            "2": { "hash": 2, "displayProperties": { "name": "Ace" }, "itemType": 3, "seasonHash": season, "isHolofoil": true }
        });
        Catalog::from_json_tables(&items.to_string(), "{}", None).unwrap()
    }

    #[test]
    fn test_unloaded_store_answers_identity() {
        let store = CatalogStore::new();
        assert!(!store.is_loaded());
        assert_eq!(store.variant_hashes(2), vec![2]);
        assert_eq!(store.version(), None);
    }

    #[test]
    fn test_populate_is_idempotent_per_version() {
        let store = CatalogStore::new();
        assert!(store.populate(catalog(1)));
        assert!(!store.populate(catalog(1)));
        assert_eq!(store.variant_hashes(2), vec![1, 2]);

        let held = store.current().unwrap();
        assert!(store.populate(catalog(2)));
        assert_ne!(held.version(), store.version().unwrap());
        // Old snapshot still usable
        assert_eq!(held.variant_hashes(1), vec![1, 2]);

        store.clear();
        assert!(!store.is_loaded());
    }
}
