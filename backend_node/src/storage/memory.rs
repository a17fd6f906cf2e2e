use super::{BlobStore, PutOptions, Result, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Simple in-memory blob store implementation for testing
pub struct MemoryBlobStore {
    data: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let data = self
            .data
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        data.get(key).cloned().ok_or_else(|| StorageError::NotFound {
            key: key.to_string(),
        })
    }

    async fn put(&self, key: &str, body: Vec<u8>, _options: PutOptions) -> Result<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        data.insert(key.to_string(), body);
        Ok(())
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let data = self
            .data
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let mut keys: Vec<String> = data
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn public_url(&self, key: &str) -> String {
        format!("memory://bucket/{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_missing_key_is_not_found() {
        let store = MemoryBlobStore::new();
        let err = store.get("inventories/0xabc.json").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = MemoryBlobStore::new();
        store
            .put("profiles/0xabc.json", b"{}".to_vec(), PutOptions::default())
            .await
            .unwrap();
        assert_eq!(store.get("profiles/0xabc.json").await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn list_prefix_filters_and_sorts() {
        let store = MemoryBlobStore::new();
        for key in ["NFT/2.json", "NFT/1.json", "profiles/0xabc.json"] {
            store
                .put(key, b"{}".to_vec(), PutOptions::default())
                .await
                .unwrap();
        }
        let keys = store.list_prefix("NFT/").await.unwrap();
        assert_eq!(keys, vec!["NFT/1.json".to_string(), "NFT/2.json".to_string()]);
    }
}
