//! Catalog item HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use shared::models::ItemInput;

use super::ApiJson;
use crate::services::ItemService;
use crate::AppState;

/// Create an item
pub async fn create_item(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ItemInput>,
) -> impl IntoResponse {
    let service = ItemService::new(state.store.clone());

    match service.create_item(input).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List all items
pub async fn list_items(State(state): State<AppState>) -> impl IntoResponse {
    let service = ItemService::new(state.store.clone());

    match service.list_items().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get one item
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ItemService::new(state.store.clone());

    match service.get_item(item_id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Replace an item
pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    ApiJson(input): ApiJson<ItemInput>,
) -> impl IntoResponse {
    let service = ItemService::new(state.store.clone());

    match service.update_item(item_id, input).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete an item and the bill lines referencing it
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ItemService::new(state.store.clone());

    match service.delete_item(item_id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}
