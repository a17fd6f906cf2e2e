//! Environment configuration.
//!
//! Everything externally supplied lives here: object-storage endpoint and
//! credentials, the listen port and the model artifact path. A `.env` file
//! is honored when present (loaded by the binary via `dotenvy`).

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub s3_endpoint: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,
    pub s3_bucket: String,
    pub s3_region: String,
    pub api_port: u16,
    pub model_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            s3_endpoint: require("S3_ENDPOINT_URL")?,
            s3_access_key: require("S3_KEY")?,
            s3_secret_key: require("S3_SECRET")?,
            s3_bucket: require("S3_BUCKET_NAME")?,
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "ru-central1".to_string()),
            api_port: match env::var("API_PORT") {
                Ok(port) => port.parse().context("API_PORT must be a port number")?,
                Err(_) => 8000,
            },
            model_path: env::var("PRICE_MODEL_PATH")
                .unwrap_or_else(|_| "model/price_model.json".to_string())
                .into(),
        })
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("missing required environment variable {name}"))
}
