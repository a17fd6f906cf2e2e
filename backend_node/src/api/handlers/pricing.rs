use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiResult;
use crate::api::server::AppState;
use crate::pricing::PriceBand;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictPriceRequest {
    pub item_type: String,
    pub rarity: String,
    pub bonus_value: i64,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Serialize)]
pub struct PredictPriceResponse {
    pub status: String,
    pub recommended_price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_status: Option<PriceBand>,
}

/// Recommend a price for an item; when the caller supplies an observed
/// price, also report its percentage deviation and band
pub async fn predict_price(
    State(state): State<AppState>,
    Json(request): Json<PredictPriceRequest>,
) -> ApiResult<Json<PredictPriceResponse>> {
    let bonus_value = request.bonus_value as f64;

    let response = match request.price {
        Some(observed) => {
            let assessment =
                state
                    .model
                    .assess(&request.item_type, &request.rarity, bonus_value, observed)?;
            PredictPriceResponse {
                status: "ok".to_string(),
                recommended_price: assessment.recommended,
                deviation: Some(assessment.deviation),
                price_status: Some(assessment.band),
            }
        }
        None => PredictPriceResponse {
            status: "ok".to_string(),
            recommended_price: state
                .model
                .recommend(&request.item_type, &request.rarity, bonus_value),
            deviation: None,
            price_status: None,
        },
    };
    Ok(Json(response))
}
