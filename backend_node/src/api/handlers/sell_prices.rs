use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::errors::ApiResult;
use crate::api::server::AppState;
use crate::types::{SellPriceUpdate, SellPrices};

#[derive(Serialize)]
pub struct UpdateSellPricesResponse {
    pub status: String,
    pub updated: SellPrices,
}

/// Current global sell-price mapping
pub async fn get_sell_prices(State(state): State<AppState>) -> Json<SellPrices> {
    Json(state.sell_prices.current().await)
}

/// Overwrite the rarity tiers present in the body; unknown keys are ignored
pub async fn update_sell_prices(
    State(state): State<AppState>,
    Json(update): Json<SellPriceUpdate>,
) -> ApiResult<Json<UpdateSellPricesResponse>> {
    let updated = state.sell_prices.update(update).await?;
    Ok(Json(UpdateSellPricesResponse {
        status: "ok".to_string(),
        updated,
    }))
}
