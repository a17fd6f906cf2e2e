//! Global sell-price configuration.
//!
//! A single record at `config/sell_prices.json`, read once at startup and
//! materialized with hardcoded defaults on first run.

use super::{corrupt, Result};
use crate::storage::{BlobStore, PutOptions, StorageError};
use crate::types::{SellPriceUpdate, SellPrices};
use log::info;
use std::sync::Arc;
use tokio::sync::RwLock;

const SELL_PRICES_KEY: &str = "config/sell_prices.json";

pub struct SellPriceStore {
    blob: Arc<dyn BlobStore>,
    prices: RwLock<SellPrices>,
}

impl SellPriceStore {
    /// Loads the record from the backing store, persisting the defaults
    /// immediately when no record exists yet.
    pub async fn load_or_init(blob: Arc<dyn BlobStore>) -> Result<Self> {
        let prices = match blob.get(SELL_PRICES_KEY).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| corrupt(SELL_PRICES_KEY, e))?,
            Err(StorageError::NotFound { .. }) => {
                let defaults = SellPrices::default();
                let body =
                    serde_json::to_vec(&defaults).map_err(|e| corrupt(SELL_PRICES_KEY, e))?;
                blob.put(SELL_PRICES_KEY, body, PutOptions::default()).await?;
                info!("initialized sell prices with defaults");
                defaults
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            blob,
            prices: RwLock::new(prices),
        })
    }

    pub async fn current(&self) -> SellPrices {
        self.prices.read().await.clone()
    }

    /// Overwrites the rarity tiers present in the update and persists the
    /// resulting full mapping, which is also returned.
    pub async fn update(&self, update: SellPriceUpdate) -> Result<SellPrices> {
        let mut prices = self.prices.write().await;
        if let Some(common) = update.common {
            prices.common = common;
        }
        if let Some(rare) = update.rare {
            prices.rare = rare;
        }
        if let Some(epic) = update.epic {
            prices.epic = epic;
        }
        if let Some(legendary) = update.legendary {
            prices.legendary = legendary;
        }
        let body = serde_json::to_vec(&*prices).map_err(|e| corrupt(SELL_PRICES_KEY, e))?;
        self.blob
            .put(SELL_PRICES_KEY, body, PutOptions::default())
            .await?;
        Ok(prices.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;

    #[tokio::test]
    async fn fresh_store_materializes_defaults() {
        let blob: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let store = SellPriceStore::load_or_init(blob.clone()).await.unwrap();
        assert_eq!(store.current().await, SellPrices::default());

        // The defaults were persisted, not just cached.
        let bytes = blob.get(SELL_PRICES_KEY).await.unwrap();
        let persisted: SellPrices = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(persisted, SellPrices::default());
    }

    #[tokio::test]
    async fn partial_update_leaves_other_tiers_unchanged() {
        let blob: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let store = SellPriceStore::load_or_init(blob).await.unwrap();

        let updated = store
            .update(SellPriceUpdate {
                epic: Some(75),
                legendary: Some(150),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.common, 5);
        assert_eq!(updated.rare, 20);
        assert_eq!(updated.epic, 75);
        assert_eq!(updated.legendary, 150);
    }

    #[tokio::test]
    async fn updates_survive_a_restart() {
        let blob: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let store = SellPriceStore::load_or_init(blob.clone()).await.unwrap();
        store
            .update(SellPriceUpdate {
                common: Some(8),
                ..Default::default()
            })
            .await
            .unwrap();

        let reloaded = SellPriceStore::load_or_init(blob).await.unwrap();
        assert_eq!(reloaded.current().await.common, 8);
    }
}
