//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use todo_core::{CreateItemRequest, Item, ItemId, TodoError, UpdateItemRequest};

use crate::error::ApiError;
use crate::AppState;

/// Liveness payload
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Liveness check, independent of the store
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Todo API is running".to_string(),
    })
}

/// Store summary
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub items: u64,
    pub schema_version: u32,
}

/// Get store status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let (items, schema_version) = state
        .with_repository(|repo| Ok((repo.count()?, repo.schema_version()?)))
        .map_err(ApiError::from_core("Failed to read status"))?;

    Ok(Json(StatusResponse {
        items,
        schema_version,
    }))
}

/// List all items in reminder order
pub async fn list_items(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Item>>, ApiError> {
    state
        .with_repository(|repo| repo.list_all())
        .map(Json)
        .map_err(ApiError::from_core("Failed to fetch items"))
}

/// Get a specific item
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    let context = "Failed to fetch item";
    let id = ItemId::parse(&id).map_err(ApiError::from_core(context))?;

    state
        .with_repository(|repo| repo.get(id)?.ok_or(TodoError::NotFound(id)))
        .map(Json)
        .map_err(ApiError::from_core(context))
}

/// Create a new item
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let context = "Failed to create item";
    let Json(request) = body?;
    let new_item = request.validate().map_err(ApiError::from_core(context))?;

    let item = state
        .with_repository(|repo| repo.create(&new_item))
        .map_err(ApiError::from_core(context))?;

    tracing::info!(id = %item.id, "Created item");
    Ok((StatusCode::CREATED, Json(item)))
}

/// Apply a partial update
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<Json<Item>, ApiError> {
    let context = "Failed to update item";
    let id = ItemId::parse(&id).map_err(ApiError::from_core(context))?;
    let Json(request) = body?;
    let changes = request.validate().map_err(ApiError::from_core(context))?;

    state
        .with_repository(|repo| repo.update(id, &changes)?.ok_or(TodoError::NotFound(id)))
        .map(Json)
        .map_err(ApiError::from_core(context))
}

/// Flip an item's completed flag in one store operation
pub async fn toggle_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    let context = "Failed to update item";
    let id = ItemId::parse(&id).map_err(ApiError::from_core(context))?;

    state
        .with_repository(|repo| repo.toggle_completed(id)?.ok_or(TodoError::NotFound(id)))
        .map(Json)
        .map_err(ApiError::from_core(context))
}

/// Delete an item
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let context = "Failed to delete item";
    let id = ItemId::parse(&id).map_err(ApiError::from_core(context))?;

    let removed = state
        .with_repository(|repo| repo.delete(id))
        .map_err(ApiError::from_core(context))?;

    if !removed {
        return Err(ApiError::NotFound);
    }

    tracing::info!(%id, "Deleted item");
    Ok(StatusCode::NO_CONTENT)
}
