//! Handlers for `/subtasks`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{json, Value};

use crate::model::{Subtask, TaskId};

use super::routes::{manager_error, not_found, ApiError, AppState};

pub(super) async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Subtask>> {
    let manager = state.manager.lock().await;
    Json(manager.subtasks())
}

pub(super) async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Subtask>, ApiError> {
    let mut manager = state.manager.lock().await;
    manager
        .subtask(TaskId(id))
        .map(Json)
        .ok_or_else(|| not_found(TaskId(id)))
}

pub(super) async fn create(
    State(state): State<Arc<AppState>>,
    Json(subtask): Json<Subtask>,
) -> Result<(StatusCode, Json<Subtask>), ApiError> {
    let mut manager = state.manager.lock().await;
    let created = manager.create_subtask(subtask).map_err(manager_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(subtask): Json<Subtask>,
) -> Result<(StatusCode, Json<Subtask>), ApiError> {
    let mut manager = state.manager.lock().await;
    let updated = manager
        .update_subtask(TaskId(id), subtask)
        .map_err(manager_error)?;
    Ok((StatusCode::CREATED, Json(updated)))
}

pub(super) async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Subtask>, ApiError> {
    let mut manager = state.manager.lock().await;
    manager
        .delete_subtask(TaskId(id))
        .map(Json)
        .map_err(manager_error)
}

pub(super) async fn delete_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let mut manager = state.manager.lock().await;
    manager.delete_subtasks().map_err(manager_error)?;
    Ok(Json(json!({ "success": true })))
}
