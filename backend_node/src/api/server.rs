use anyhow::Result;
use axum::{
    http::Method,
    routing::{delete, get, patch, post},
    Router,
};
use log::info;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::api::handlers::{inventory, nft, pricing, profiles, sell_prices, status};
use crate::config::Config;
use crate::pricing::PriceModel;
use crate::storage::{BlobStore, S3BlobStore};
use crate::stores::{InventoryStore, NftStore, ProfileStore, SellPriceStore};

// Application State
#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<InventoryStore>,
    pub profiles: Arc<ProfileStore>,
    pub sell_prices: Arc<SellPriceStore>,
    pub nfts: Arc<NftStore>,
    pub model: Arc<PriceModel>,
    pub http: reqwest::Client,
}

impl AppState {
    /// Wires the stores over a blob store and loads the sell-price record.
    /// The blob store is injected so tests can run against the in-memory one.
    pub async fn new(blob: Arc<dyn BlobStore>, model: PriceModel) -> Result<Self> {
        let sell_prices = SellPriceStore::load_or_init(blob.clone()).await?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            inventory: Arc::new(InventoryStore::new(blob.clone())),
            profiles: Arc::new(ProfileStore::new(blob.clone())),
            sell_prices: Arc::new(sell_prices),
            nfts: Arc::new(NftStore::new(blob)),
            model: Arc::new(model),
            http,
        })
    }
}

// API Router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status::root))
        // Inventory endpoints
        .route("/inventory/:address", get(inventory::get_inventory))
        .route("/inventory/:address", post(inventory::add_item))
        .route("/inventory/:address/:item_id", delete(inventory::delete_item))
        // Profile endpoints
        .route("/profile/:address", get(profiles::get_profile))
        .route("/profile/:address", patch(profiles::patch_profile))
        .route("/profile/", post(profiles::create_or_update_profile))
        .route("/profiles", get(profiles::list_profiles))
        // Sell-price configuration
        .route("/sell-prices", get(sell_prices::get_sell_prices))
        .route("/sell-prices", post(sell_prices::update_sell_prices))
        // NFT records
        .route("/nft/create-json", post(nft::create_nft_json))
        .route("/nft/save", post(nft::save_final_nft))
        .route("/nft", get(nft::list_nfts))
        .route("/nft/:token_id", get(nft::get_nft))
        .route("/metadata-proxy/", get(nft::proxy_metadata))
        // Price advisor
        .route("/predict-price", post(pricing::predict_price))
        // CORS for the game frontend
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers(Any),
        )
        .with_state(state)
}

// Server startup
pub async fn start_api_server(config: Config) -> Result<()> {
    let blob: Arc<dyn BlobStore> = Arc::new(S3BlobStore::new(
        &config.s3_endpoint,
        &config.s3_bucket,
        &config.s3_region,
        &config.s3_access_key,
        &config.s3_secret_key,
    )?);
    let model = PriceModel::load(&config.model_path)?;
    let state = AppState::new(blob, model).await?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.api_port)).await?;
    info!(
        "GameGems API server listening on http://0.0.0.0:{}",
        config.api_port
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
