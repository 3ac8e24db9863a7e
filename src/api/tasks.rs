//! Handlers for `/tasks`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{json, Value};

use crate::model::{Task, TaskId};

use super::routes::{manager_error, not_found, ApiError, AppState};

pub(super) async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Task>> {
    let manager = state.manager.lock().await;
    Json(manager.tasks())
}

pub(super) async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Task>, ApiError> {
    let mut manager = state.manager.lock().await;
    manager
        .task(TaskId(id))
        .map(Json)
        .ok_or_else(|| not_found(TaskId(id)))
}

pub(super) async fn create(
    State(state): State<Arc<AppState>>,
    Json(task): Json<Task>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let mut manager = state.manager.lock().await;
    let created = manager.create_task(task).map_err(manager_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(task): Json<Task>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let mut manager = state.manager.lock().await;
    let updated = manager.update_task(TaskId(id), task).map_err(manager_error)?;
    Ok((StatusCode::CREATED, Json(updated)))
}

pub(super) async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Task>, ApiError> {
    let mut manager = state.manager.lock().await;
    manager.delete_task(TaskId(id)).map(Json).map_err(manager_error)
}

pub(super) async fn delete_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let mut manager = state.manager.lock().await;
    manager.delete_tasks().map_err(manager_error)?;
    Ok(Json(json!({ "success": true })))
}
