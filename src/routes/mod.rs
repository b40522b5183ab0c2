pub mod clock_in;
pub mod extract;
pub mod items;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::DocumentStore;
use crate::error::AppResult;
use crate::services::{ClockInService, ItemsService};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub items: Arc<ItemsService>,
    pub clock_ins: Arc<ClockInService>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            items: Arc::new(ItemsService::new(store.clone())),
            clock_ins: Arc::new(ClockInService::new(store.clone())),
            store,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .route("/", get(read_root))
        .route("/health", get(health))
        .route("/items", post(items::create_item))
        .route("/items/filter", get(items::filter_items))
        .route("/items/aggregation", get(items::item_count_by_email))
        .route(
            "/items/:id",
            get(items::read_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .route(
            "/clock_in",
            get(clock_in::list_clock_ins).post(clock_in::create_clock_in),
        )
        .route("/clock_in/filter", get(clock_in::filter_clock_ins))
        .route(
            "/clock_in/:id",
            get(clock_in::read_clock_in)
                .put(clock_in::update_clock_in)
                .delete(clock_in::delete_clock_in),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn read_root() -> Json<Value> {
    Json(json!({ "message": "CRUD API with MongoDB" }))
}

async fn health(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.store.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}
