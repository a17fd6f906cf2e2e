use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::server::AppState;
use crate::types::FinalNft;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftWrapRequest {
    pub account: String,
    pub item_id: String,
    pub json: Value,
}

#[derive(Serialize)]
pub struct NftWrapResponse {
    pub uri: String,
}

#[derive(Serialize)]
pub struct SaveNftResponse {
    pub status: String,
    pub saved: String,
}

#[derive(Deserialize)]
pub struct ProxyParams {
    pub url: String,
}

/// Write a caller-supplied metadata document to a generated unique path and
/// return its public URL
pub async fn create_nft_json(
    State(state): State<AppState>,
    Json(request): Json<NftWrapRequest>,
) -> ApiResult<Json<NftWrapResponse>> {
    let uri = state
        .nfts
        .create_metadata(&request.account, &request.item_id, &request.json)
        .await?;
    Ok(Json(NftWrapResponse { uri }))
}

/// Save the canonical record for a token id (last write wins)
pub async fn save_final_nft(
    State(state): State<AppState>,
    Json(nft): Json<FinalNft>,
) -> ApiResult<Json<SaveNftResponse>> {
    let saved = state.nfts.save_final(&nft).await?;
    Ok(Json(SaveNftResponse {
        status: "ok".to_string(),
        saved,
    }))
}

/// All canonical NFT records
pub async fn list_nfts(State(state): State<AppState>) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(state.nfts.list_all().await?))
}

/// One canonical record by token id, 404 when never saved
pub async fn get_nft(
    State(state): State<AppState>,
    Path(token_id): Path<u64>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.nfts.get(token_id).await?))
}

/// Fetches a caller-supplied URL and relays its JSON body. Deployed behind
/// the game frontend only; the URL is not restricted.
pub async fn proxy_metadata(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
) -> ApiResult<Json<Value>> {
    let response = state
        .http
        .get(&params.url)
        .send()
        .await
        .map_err(|e| ApiError::upstream_failure(&e.to_string()))?;
    let response = response
        .error_for_status()
        .map_err(|e| ApiError::upstream_failure(&e.to_string()))?;
    let body = response
        .json()
        .await
        .map_err(|e| ApiError::upstream_failure(&e.to_string()))?;
    Ok(Json(body))
}
