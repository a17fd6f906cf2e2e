//! NFT metadata blobs and canonical NFT records.
//!
//! Metadata blobs are write-once documents under `nft_data/` with generated
//! unique names; canonical records live at `NFT/{tokenId}.json` and are
//! overwritten on resave (last writer wins, no version check).

use super::{corrupt, Result, StoreError};
use crate::storage::{BlobStore, PutOptions, StorageError};
use crate::types::FinalNft;
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

const METADATA_PREFIX: &str = "nft_data/";
const FINAL_PREFIX: &str = "NFT/";

pub struct NftStore {
    blob: Arc<dyn BlobStore>,
}

impl NftStore {
    pub fn new(blob: Arc<dyn BlobStore>) -> Self {
        Self { blob }
    }

    fn final_key(token_id: u64) -> String {
        format!("{FINAL_PREFIX}{token_id}.json")
    }

    /// Writes a caller-supplied metadata document verbatim under a generated
    /// unique name and returns its public URL. The document's internal shape
    /// is not validated.
    pub async fn create_metadata(&self, account: &str, item_id: &str, document: &Value) -> Result<String> {
        let key = format!("{METADATA_PREFIX}{account}_{item_id}_{}.json", Uuid::new_v4());
        let body = serde_json::to_vec(document).map_err(|e| corrupt(&key, e))?;
        self.blob.put(&key, body, PutOptions::public_json()).await?;
        debug!("wrote NFT metadata blob {key}");
        Ok(self.blob.public_url(&key))
    }

    /// Writes or overwrites the canonical record for a token id and returns
    /// the storage key.
    pub async fn save_final(&self, nft: &FinalNft) -> Result<String> {
        let key = Self::final_key(nft.token_id);
        let body = serde_json::to_vec(nft).map_err(|e| corrupt(&key, e))?;
        self.blob.put(&key, body, PutOptions::public_json()).await?;
        debug!("saved final NFT record {key}");
        Ok(key)
    }

    /// All canonical records under `NFT/`. Keys not ending in `.json` are
    /// ignored; unreadable or corrupt records are logged and skipped so one
    /// bad object cannot abort the whole listing.
    pub async fn list_all(&self) -> Result<Vec<Value>> {
        let keys = self.blob.list_prefix(FINAL_PREFIX).await?;
        let mut records = Vec::new();
        for key in keys {
            if !key.ends_with(".json") {
                continue;
            }
            let bytes = match self.blob.get(&key).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("skipping unreadable NFT record {key}: {e}");
                    continue;
                }
            };
            match serde_json::from_slice(&bytes) {
                Ok(value) => records.push(value),
                Err(e) => warn!("skipping corrupt NFT record {key}: {e}"),
            }
        }
        Ok(records)
    }

    /// The canonical record for one token id. Only a missing key maps to
    /// [`StoreError::NotFound`]; backend failures and corrupt documents keep
    /// their own error kinds.
    pub async fn get(&self, token_id: u64) -> Result<Value> {
        let key = Self::final_key(token_id);
        let bytes = self.blob.get(&key).await.map_err(|e| match e {
            StorageError::NotFound { .. } => StoreError::NotFound(format!("NFT {token_id}")),
            other => other.into(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| corrupt(&key, e))
    }
}
