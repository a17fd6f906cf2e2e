//! Domain stores layered on the blob store: read-through caches for
//! inventories and profiles, the global sell-price record, and NFT records.

use crate::storage::StorageError;
use thiserror::Error;

pub mod inventory;
pub mod nft;
pub mod profile;
pub mod sell_prices;

pub use inventory::InventoryStore;
pub use nft::NftStore;
pub use profile::ProfileStore;
pub use sell_prices::SellPriceStore;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("item with id {0} already exists")]
    DuplicateItem(String),
    #[error("invalid value for field {0}")]
    InvalidField(String),
    #[error("corrupt record at {key}: {message}")]
    Corrupt { key: String, message: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub(crate) fn corrupt(key: &str, err: serde_json::Error) -> StoreError {
    StoreError::Corrupt {
        key: key.to_string(),
        message: err.to_string(),
    }
}
