use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::api::errors::ApiResult;
use crate::api::server::AppState;
use crate::types::Item;

#[derive(Serialize)]
pub struct AddItemResponse {
    pub status: String,
    pub item_id: String,
}

#[derive(Serialize)]
pub struct DeleteItemResponse {
    pub status: String,
    pub deleted: usize,
}

/// Get the inventory for an address (empty for never-written addresses)
pub async fn get_inventory(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Json<Vec<Item>>> {
    Ok(Json(state.inventory.items(&address).await?))
}

/// Append an item to an inventory; duplicate ids are rejected with 400
pub async fn add_item(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Json(item): Json<Item>,
) -> ApiResult<Json<AddItemResponse>> {
    let item_id = state.inventory.add_item(&address, item).await?;
    Ok(Json(AddItemResponse {
        status: "ok".to_string(),
        item_id,
    }))
}

/// Remove an item by id; absent ids yield 404
pub async fn delete_item(
    State(state): State<AppState>,
    Path((address, item_id)): Path<(String, String)>,
) -> ApiResult<Json<DeleteItemResponse>> {
    let deleted = state.inventory.remove_item(&address, &item_id).await?;
    Ok(Json(DeleteItemResponse {
        status: "ok".to_string(),
        deleted,
    }))
}
