//! GameGems marketplace backend.
//!
//! Persists per-user inventories and profiles, the global sell-price
//! configuration and NFT records as JSON blobs in an S3-compatible object
//! store, and serves price recommendations from a pre-trained regression
//! model over an axum HTTP API.

pub mod api;
pub mod config;
pub mod pricing;
pub mod storage;
pub mod stores;
pub mod types;
