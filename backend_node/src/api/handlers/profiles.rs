use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::errors::ApiResult;
use crate::api::server::AppState;
use crate::types::Profile;

#[derive(Serialize)]
pub struct SaveProfileResponse {
    pub status: String,
    pub address: String,
}

#[derive(Serialize)]
pub struct PatchProfileResponse {
    pub status: String,
    pub updated: Map<String, Value>,
}

/// Get one profile, 404 when the address has none
pub async fn get_profile(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(state.profiles.get(&address).await?))
}

/// Create-or-replace a profile. The address is echoed back as supplied;
/// storage always keys by the lowercase form.
pub async fn create_or_update_profile(
    State(state): State<AppState>,
    Json(profile): Json<Profile>,
) -> ApiResult<Json<SaveProfileResponse>> {
    let address = profile.address.clone();
    state.profiles.upsert(profile).await?;
    Ok(Json(SaveProfileResponse {
        status: "ok".to_string(),
        address,
    }))
}

/// Partially update a profile; the response echoes the fields that were
/// actually applied
pub async fn patch_profile(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Json(updates): Json<Map<String, Value>>,
) -> ApiResult<Json<PatchProfileResponse>> {
    let updated = state.profiles.patch(&address, updates).await?;
    Ok(Json(PatchProfileResponse {
        status: "ok".to_string(),
        updated,
    }))
}

/// All stored profiles, best-effort: unreadable records are skipped
pub async fn list_profiles(State(state): State<AppState>) -> ApiResult<Json<Vec<Profile>>> {
    Ok(Json(state.profiles.list_all().await?))
}
