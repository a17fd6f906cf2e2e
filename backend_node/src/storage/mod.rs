//! Blob-store abstraction over the S3-compatible object storage backend.
//!
//! The backend is treated as a key-value byte store addressed by string
//! paths with list-by-prefix. The only structured error callers depend on
//! is [`StorageError::NotFound`]; everything else propagates untouched.

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod s3;

pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("key not found: {key}")]
    NotFound { key: String },
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("invalid data at {key}: {message}")]
    InvalidData { key: String, message: String },
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

/// Write options for a blob. `public` marks the object world-readable so the
/// returned URL can be dereferenced by wallets and marketplaces.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub public: bool,
}

impl PutOptions {
    pub fn public_json() -> Self {
        Self {
            content_type: Some("application/json".to_string()),
            public: true,
        }
    }
}

/// Pass-through adapter over the object storage backend. No retries and no
/// caching at this layer.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
    async fn put(&self, key: &str, body: Vec<u8>, options: PutOptions) -> Result<()>;
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Deterministic public URL for a key, built from endpoint and bucket.
    fn public_url(&self, key: &str) -> String;
}
