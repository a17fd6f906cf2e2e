//! Per-address item inventories.
//!
//! Each inventory is persisted as a single JSON array at
//! `inventories/{address}.json` and cached in memory after the first access.
//! A cache entry's presence is the "loaded" marker, so an empty inventory is
//! distinguishable from one that has never been read.

use super::{corrupt, Result, StoreError};
use crate::storage::{BlobStore, PutOptions, StorageError};
use crate::types::{canonical_address, Item};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const INVENTORY_PREFIX: &str = "inventories/";

pub struct InventoryStore {
    blob: Arc<dyn BlobStore>,
    cache: RwLock<HashMap<String, Vec<Item>>>,
}

impl InventoryStore {
    pub fn new(blob: Arc<dyn BlobStore>) -> Self {
        Self {
            blob,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn key(address: &str) -> String {
        format!("{INVENTORY_PREFIX}{address}.json")
    }

    async fn load(&self, address: &str) -> Result<Vec<Item>> {
        let key = Self::key(address);
        match self.blob.get(&key).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| corrupt(&key, e)),
            Err(StorageError::NotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, address: &str, items: &[Item]) -> Result<()> {
        let body = serde_json::to_vec(items).map_err(|e| corrupt(&Self::key(address), e))?;
        self.blob
            .put(&Self::key(address), body, PutOptions::default())
            .await?;
        Ok(())
    }

    /// Items for an address, in insertion order. Never-written addresses
    /// yield an empty list.
    pub async fn items(&self, address: &str) -> Result<Vec<Item>> {
        let address = canonical_address(address);
        {
            let cache = self.cache.read().await;
            if let Some(items) = cache.get(&address) {
                return Ok(items.clone());
            }
        }
        // The write lock is re-checked: another task may have hydrated the
        // entry between the read above and acquiring the lock here.
        let mut cache = self.cache.write().await;
        if let Some(items) = cache.get(&address) {
            return Ok(items.clone());
        }
        let items = self.load(&address).await?;
        cache.insert(address, items.clone());
        Ok(items)
    }

    /// Appends an item, persisting the full list. Fails with
    /// [`StoreError::DuplicateItem`] when the id is already present, leaving
    /// both cache and blob untouched.
    pub async fn add_item(&self, address: &str, item: Item) -> Result<String> {
        let address = canonical_address(address);
        // The write lock is held across the read-modify-write so same-process
        // writers to one address cannot drop each other's updates.
        let mut cache = self.cache.write().await;
        if !cache.contains_key(&address) {
            let items = self.load(&address).await?;
            cache.insert(address.clone(), items);
        }
        let items = cache
            .get_mut(&address)
            .ok_or_else(|| StoreError::NotFound(format!("inventory for {address}")))?;

        if items.iter().any(|existing| existing.id == item.id) {
            return Err(StoreError::DuplicateItem(item.id));
        }
        let item_id = item.id.clone();
        items.push(item);
        let snapshot = items.clone();
        self.persist(&address, &snapshot).await?;
        debug!("added item {item_id} to inventory {address}");
        Ok(item_id)
    }

    /// Removes an item by id. Absent ids fail with [`StoreError::NotFound`]
    /// and nothing is persisted.
    pub async fn remove_item(&self, address: &str, item_id: &str) -> Result<usize> {
        let address = canonical_address(address);
        let mut cache = self.cache.write().await;
        if !cache.contains_key(&address) {
            let items = self.load(&address).await?;
            cache.insert(address.clone(), items);
        }
        let items = cache
            .get_mut(&address)
            .ok_or_else(|| StoreError::NotFound(format!("inventory for {address}")))?;

        let before = items.len();
        items.retain(|item| item.id != item_id);
        if items.len() == before {
            return Err(StoreError::NotFound(format!("item {item_id}")));
        }
        let snapshot = items.clone();
        self.persist(&address, &snapshot).await?;
        debug!("removed item {item_id} from inventory {address}");
        Ok(before - items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;
    use serde_json::Map;

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            item_type: "Sword".to_string(),
            rarity: "rare".to_string(),
            image: format!("https://cdn.example/{id}.png"),
            attributes: Map::new(),
        }
    }

    fn store() -> InventoryStore {
        InventoryStore::new(Arc::new(MemoryBlobStore::new()))
    }

    #[tokio::test]
    async fn unwritten_address_yields_empty_inventory() {
        let store = store();
        assert!(store.items("0xAbC").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn items_appear_in_insertion_order() {
        let store = store();
        store.add_item("0xabc", item("a")).await.unwrap();
        store.add_item("0xabc", item("b")).await.unwrap();
        store.add_item("0xabc", item("c")).await.unwrap();
        let ids: Vec<_> = store
            .items("0xABC")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected_and_leaves_inventory_unchanged() {
        let store = store();
        store.add_item("0xabc", item("a")).await.unwrap();
        let err = store.add_item("0xabc", item("a")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateItem(id) if id == "a"));
        assert_eq!(store.items("0xabc").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn removing_absent_item_fails_without_changes() {
        let store = store();
        store.add_item("0xabc", item("a")).await.unwrap();
        let err = store.remove_item("0xabc", "zzz").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(store.items("0xabc").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn removing_present_item_returns_count_one() {
        let store = store();
        store.add_item("0xabc", item("a")).await.unwrap();
        store.add_item("0xabc", item("b")).await.unwrap();
        assert_eq!(store.remove_item("0xabc", "a").await.unwrap(), 1);
        let ids: Vec<_> = store
            .items("0xabc")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn inventory_survives_a_fresh_store_over_the_same_blobs() {
        let blob: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let first = InventoryStore::new(blob.clone());
        first.add_item("0xAbC", item("a")).await.unwrap();

        let second = InventoryStore::new(blob);
        let ids: Vec<_> = second
            .items("0xabc")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["a"]);
    }
}
