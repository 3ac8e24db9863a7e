//! Handlers for `/epics`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{json, Value};

use crate::model::{Epic, Subtask, TaskId};

use super::routes::{manager_error, not_found, ApiError, AppState};

pub(super) async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Epic>> {
    let manager = state.manager.lock().await;
    Json(manager.epics())
}

pub(super) async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Epic>, ApiError> {
    let mut manager = state.manager.lock().await;
    manager
        .epic(TaskId(id))
        .map(Json)
        .ok_or_else(|| not_found(TaskId(id)))
}

pub(super) async fn create(
    State(state): State<Arc<AppState>>,
    Json(epic): Json<Epic>,
) -> Result<(StatusCode, Json<Epic>), ApiError> {
    let mut manager = state.manager.lock().await;
    let created = manager.create_epic(epic).map_err(manager_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(epic): Json<Epic>,
) -> Result<(StatusCode, Json<Epic>), ApiError> {
    let mut manager = state.manager.lock().await;
    let updated = manager.update_epic(TaskId(id), epic).map_err(manager_error)?;
    Ok((StatusCode::CREATED, Json(updated)))
}

pub(super) async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Epic>, ApiError> {
    let mut manager = state.manager.lock().await;
    manager.delete_epic(TaskId(id)).map(Json).map_err(manager_error)
}

pub(super) async fn delete_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let mut manager = state.manager.lock().await;
    manager.delete_epics().map_err(manager_error)?;
    Ok(Json(json!({ "success": true })))
}

pub(super) async fn subtasks_of(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<Subtask>>, ApiError> {
    let manager = state.manager.lock().await;
    manager
        .subtasks_of_epic(TaskId(id))
        .map(Json)
        .map_err(manager_error)
}
