//! Per-address user profiles.
//!
//! One JSON blob per address under `profiles/`, cached after first access.
//! The cache value is `Option<Profile>` so "load attempted, nothing there"
//! is remembered and not re-fetched on every request.

use super::{corrupt, Result, StoreError};
use crate::storage::{BlobStore, PutOptions, StorageError};
use crate::types::{canonical_address, Profile};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const PROFILE_PREFIX: &str = "profiles/";

pub struct ProfileStore {
    blob: Arc<dyn BlobStore>,
    cache: RwLock<HashMap<String, Option<Profile>>>,
}

impl ProfileStore {
    pub fn new(blob: Arc<dyn BlobStore>) -> Self {
        Self {
            blob,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn key(address: &str) -> String {
        format!("{PROFILE_PREFIX}{address}.json")
    }

    async fn load(&self, address: &str) -> Result<Option<Profile>> {
        let key = Self::key(address);
        match self.blob.get(&key).await {
            Ok(bytes) => {
                let profile = serde_json::from_slice(&bytes).map_err(|e| corrupt(&key, e))?;
                Ok(Some(profile))
            }
            Err(StorageError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, address: &str) -> Result<Profile> {
        let address = canonical_address(address);
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&address) {
                return entry
                    .clone()
                    .ok_or_else(|| StoreError::NotFound(format!("profile for {address}")));
            }
        }
        let mut cache = self.cache.write().await;
        if let Some(entry) = cache.get(&address) {
            return entry
                .clone()
                .ok_or_else(|| StoreError::NotFound(format!("profile for {address}")));
        }
        let entry = self.load(&address).await?;
        cache.insert(address.clone(), entry.clone());
        entry.ok_or_else(|| StoreError::NotFound(format!("profile for {address}")))
    }

    /// Create-or-replace: overwrites both cache entry and backing blob.
    pub async fn upsert(&self, profile: Profile) -> Result<()> {
        let address = canonical_address(&profile.address);
        let key = Self::key(&address);
        let body = serde_json::to_vec(&profile).map_err(|e| corrupt(&key, e))?;

        let mut cache = self.cache.write().await;
        self.blob.put(&key, body, PutOptions::default()).await?;
        cache.insert(address.clone(), Some(profile));
        debug!("saved profile {address}");
        Ok(())
    }

    /// Applies a partial update and returns the subset that was applied.
    ///
    /// Only `created_at`, `nickname` and `local_gems` are patchable; keys
    /// outside that allow-list are ignored. A known key with a value of the
    /// wrong type fails the whole patch with [`StoreError::InvalidField`].
    pub async fn patch(&self, address: &str, updates: Map<String, Value>) -> Result<Map<String, Value>> {
        let address = canonical_address(address);
        let mut cache = self.cache.write().await;
        if !cache.contains_key(&address) {
            let entry = self.load(&address).await?;
            cache.insert(address.clone(), entry);
        }
        let mut profile = cache
            .get(&address)
            .and_then(|entry| entry.clone())
            .ok_or_else(|| StoreError::NotFound(format!("profile for {address}")))?;

        let mut applied = Map::new();
        for (field, value) in updates {
            match field.as_str() {
                "created_at" => profile.created_at = patch_optional_string(&field, &value)?,
                "nickname" => profile.nickname = patch_optional_string(&field, &value)?,
                "local_gems" => {
                    profile.local_gems = value
                        .as_i64()
                        .ok_or_else(|| StoreError::InvalidField(field.clone()))?;
                }
                _ => continue,
            }
            applied.insert(field, value);
        }

        let key = Self::key(&address);
        let body = serde_json::to_vec(&profile).map_err(|e| corrupt(&key, e))?;
        self.blob.put(&key, body, PutOptions::default()).await?;
        cache.insert(address.clone(), Some(profile));
        debug!("patched profile {address}: {} field(s)", applied.len());
        Ok(applied)
    }

    /// Every profile in the backing store. Unreadable or corrupt records are
    /// logged and skipped; only the prefix listing itself can fail.
    pub async fn list_all(&self) -> Result<Vec<Profile>> {
        let keys = self.blob.list_prefix(PROFILE_PREFIX).await?;
        let mut profiles = Vec::new();
        for key in keys {
            if !key.ends_with(".json") {
                continue;
            }
            let bytes = match self.blob.get(&key).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("skipping unreadable profile {key}: {e}");
                    continue;
                }
            };
            match serde_json::from_slice::<Profile>(&bytes) {
                Ok(profile) => profiles.push(profile),
                Err(e) => warn!("skipping corrupt profile {key}: {e}"),
            }
        }
        Ok(profiles)
    }
}

fn patch_optional_string(field: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(StoreError::InvalidField(field.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;
    use serde_json::json;

    fn profile(address: &str) -> Profile {
        Profile {
            address: address.to_string(),
            created_at: Some("2026-08-01T00:00:00Z".to_string()),
            nickname: Some("player1".to_string()),
            local_gems: 10,
        }
    }

    fn store() -> ProfileStore {
        ProfileStore::new(Arc::new(MemoryBlobStore::new()))
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let store = store();
        assert!(matches!(
            store.get("0xabc").await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn upsert_then_get_is_case_insensitive() {
        let store = store();
        store.upsert(profile("0xAbCd")).await.unwrap();
        let fetched = store.get("0XABCD").await.unwrap();
        assert_eq!(fetched.nickname.as_deref(), Some("player1"));
        assert_eq!(fetched.local_gems, 10);
    }

    #[tokio::test]
    async fn patch_applies_known_fields_and_ignores_unknown() {
        let store = store();
        store.upsert(profile("0xabc")).await.unwrap();
        let updates = json!({"nickname": "renamed", "local_gems": 42, "power_level": 9001});
        let applied = store
            .patch("0xabc", updates.as_object().unwrap().clone())
            .await
            .unwrap();
        assert_eq!(applied.len(), 2);
        assert!(!applied.contains_key("power_level"));

        let fetched = store.get("0xabc").await.unwrap();
        assert_eq!(fetched.nickname.as_deref(), Some("renamed"));
        assert_eq!(fetched.local_gems, 42);
    }

    #[tokio::test]
    async fn patch_with_wrong_type_fails() {
        let store = store();
        store.upsert(profile("0xabc")).await.unwrap();
        let updates = json!({"local_gems": "lots"});
        let err = store
            .patch("0xabc", updates.as_object().unwrap().clone())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidField(field) if field == "local_gems"));
    }

    #[tokio::test]
    async fn patch_on_missing_profile_is_not_found() {
        let store = store();
        let err = store
            .patch("0xmissing", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_all_skips_corrupt_records() {
        let blob = Arc::new(MemoryBlobStore::new());
        blob.put(
            "profiles/0xbad.json",
            b"not json".to_vec(),
            PutOptions::default(),
        )
        .await
        .unwrap();
        let store = ProfileStore::new(blob);
        store.upsert(profile("0xgood")).await.unwrap();

        let profiles = store.list_all().await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].address, "0xgood");
    }
}
