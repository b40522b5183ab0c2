use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use super::extract::{ValidJson, ValidQuery};
use super::AppState;
use crate::error::AppResult;
use crate::models::{EmailCount, Item, ItemPayload};
use crate::query::ItemFilter;

pub async fn create_item(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<ItemPayload>,
) -> AppResult<Json<Item>> {
    Ok(Json(state.items.create_item(payload).await?))
}

pub async fn filter_items(
    State(state): State<AppState>,
    ValidQuery(filter): ValidQuery<ItemFilter>,
) -> AppResult<Json<Vec<Item>>> {
    Ok(Json(state.items.filter_items(&filter).await?))
}

pub async fn item_count_by_email(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<EmailCount>>> {
    Ok(Json(state.items.aggregate_by_email().await?))
}

pub async fn read_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Item>> {
    Ok(Json(state.items.get_item(&id).await?))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<ItemPayload>,
) -> AppResult<Json<Value>> {
    state.items.update_item(&id, payload).await?;
    Ok(Json(json!({ "message": "Item updated successfully" })))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    state.items.delete_item(&id).await?;
    Ok(Json(json!({ "message": "Item deleted successfully" })))
}
