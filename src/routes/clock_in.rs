use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use super::extract::{ValidJson, ValidQuery};
use super::AppState;
use crate::error::AppResult;
use crate::models::{ClockIn, ClockInCreated, ClockInPayload};
use crate::query::ClockInFilter;

pub async fn create_clock_in(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<ClockInPayload>,
) -> AppResult<Json<ClockInCreated>> {
    Ok(Json(state.clock_ins.create_clock_in(payload).await?))
}

pub async fn list_clock_ins(State(state): State<AppState>) -> AppResult<Json<Vec<ClockIn>>> {
    Ok(Json(state.clock_ins.list_clock_ins().await?))
}

pub async fn filter_clock_ins(
    State(state): State<AppState>,
    ValidQuery(filter): ValidQuery<ClockInFilter>,
) -> AppResult<Json<Vec<ClockIn>>> {
    Ok(Json(state.clock_ins.filter_clock_ins(&filter).await?))
}

pub async fn read_clock_in(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ClockIn>> {
    Ok(Json(state.clock_ins.get_clock_in(&id).await?))
}

pub async fn update_clock_in(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<ClockInPayload>,
) -> AppResult<Json<Value>> {
    state.clock_ins.update_clock_in(&id, payload).await?;
    Ok(Json(json!({ "message": "Clock in updated successfully" })))
}

pub async fn delete_clock_in(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    state.clock_ins.delete_clock_in(&id).await?;
    Ok(Json(json!({ "message": "Clock in deleted successfully" })))
}
