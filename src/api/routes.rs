//! Router, shared state and the cross-cutting handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::ManagerError;
use crate::manager::{self, TaskManager};
use crate::model::{TaskId, TaskRecord};

use super::{epics, subtasks, tasks};

/// Shared application state.
///
/// A single mutex serializes every operation: the manager is not internally
/// thread-safe and its validate-then-mutate sequences must not interleave.
pub struct AppState {
    pub manager: Mutex<Box<dyn TaskManager>>,
}

impl AppState {
    pub fn new(manager: Box<dyn TaskManager>) -> Arc<Self> {
        Arc::new(Self {
            manager: Mutex::new(manager),
        })
    }
}

/// Error shape every handler returns: status code plus `{"error": ...}`.
pub(super) type ApiError = (StatusCode, Json<Value>);

pub(super) fn not_found(id: TaskId) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("No entity with id {id}") })),
    )
}

pub(super) fn manager_error(err: ManagerError) -> ApiError {
    match err {
        ManagerError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": err.to_string() })))
        }
        ManagerError::TimeConflict { ref ids } => (
            StatusCode::NOT_ACCEPTABLE,
            Json(json!({ "error": err.to_string(), "conflicting_ids": ids })),
        ),
        ManagerError::InvalidRecord { .. } | ManagerError::Io(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        ),
    }
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let manager = manager::create_task_manager(config.store, config.store_file.clone())?;
    let state = AppState::new(manager);
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/tasks",
            get(tasks::list).post(tasks::create).delete(tasks::delete_all),
        )
        .route(
            "/tasks/:id",
            get(tasks::get).post(tasks::update).delete(tasks::delete),
        )
        .route(
            "/epics",
            get(epics::list).post(epics::create).delete(epics::delete_all),
        )
        .route(
            "/epics/:id",
            get(epics::get).post(epics::update).delete(epics::delete),
        )
        .route("/epics/:id/subtasks", get(epics::subtasks_of))
        .route(
            "/subtasks",
            get(subtasks::list)
                .post(subtasks::create)
                .delete(subtasks::delete_all),
        )
        .route(
            "/subtasks/:id",
            get(subtasks::get)
                .post(subtasks::update)
                .delete(subtasks::delete),
        )
        .route("/history", get(history))
        .route("/prioritized", get(prioritized))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Recently fetched entities, oldest access first.
async fn history(State(state): State<Arc<AppState>>) -> Json<Vec<TaskRecord>> {
    let manager = state.manager.lock().await;
    Json(manager.history())
}

/// Timed entries ascending by start time.
async fn prioritized(State(state): State<Arc<AppState>>) -> Json<Vec<TaskRecord>> {
    let manager = state.manager.lock().await;
    Json(manager.prioritized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::manager::InMemoryTaskManager;
    use crate::model::Task;

    fn app() -> Router {
        router(AppState::new(Box::new(InMemoryTaskManager::new())))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn create_and_fetch_a_task() {
        let app = app();
        let response = app
            .clone()
            .oneshot(post("/tasks", json!({ "name": "Feed the cat" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: Task = serde_json::from_value(body_json(response).await).unwrap();

        let response = app
            .oneshot(
                Request::get(format!("/tasks/{}", created.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["name"], "Feed the cat");
    }

    #[tokio::test]
    async fn unknown_id_is_404() {
        let response = app()
            .oneshot(Request::get("/tasks/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_id_is_400() {
        let response = app()
            .oneshot(Request::get("/tasks/banana").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn time_conflict_is_406_with_the_colliding_ids() {
        let app = app();
        let response = app
            .clone()
            .oneshot(post(
                "/tasks",
                json!({
                    "name": "X",
                    "duration_minutes": 5,
                    "start_time": "2024-05-01T12:30:00Z"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let x = body_json(response).await;

        let response = app
            .oneshot(post(
                "/tasks",
                json!({
                    "name": "Z",
                    "duration_minutes": 5,
                    "start_time": "2024-05-01T12:27:00Z"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        let body = body_json(response).await;
        assert_eq!(body["conflicting_ids"], json!([x["id"]]));
    }

    #[tokio::test]
    async fn history_reflects_fetch_order() {
        let app = app();
        let a = body_json(
            app.clone()
                .oneshot(post("/tasks", json!({ "name": "a" })))
                .await
                .unwrap(),
        )
        .await;
        let b = body_json(
            app.clone()
                .oneshot(post("/tasks", json!({ "name": "b" })))
                .await
                .unwrap(),
        )
        .await;
        for id in [&a["id"], &b["id"], &a["id"]] {
            app.clone()
                .oneshot(Request::get(format!("/tasks/{id}")).body(Body::empty()).unwrap())
                .await
                .unwrap();
        }

        let response = app
            .oneshot(Request::get("/history").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let history = body_json(response).await;
        let ids: Vec<&Value> = history.as_array().unwrap().iter().map(|r| &r["id"]).collect();
        assert_eq!(ids, vec![&b["id"], &a["id"]]);
    }

    #[tokio::test]
    async fn prioritized_orders_by_start() {
        let app = app();
        for (name, start) in [
            ("A", "2024-05-01T10:00:00Z"),
            ("B", "2024-05-01T09:00:00Z"),
            ("C", "2024-05-01T11:00:00Z"),
        ] {
            let duration = match name {
                "A" => 30,
                "B" => 45,
                _ => 15,
            };
            let response = app
                .clone()
                .oneshot(post(
                    "/tasks",
                    json!({ "name": name, "duration_minutes": duration, "start_time": start }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(Request::get("/prioritized").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let ordered = body_json(response).await;
        let names: Vec<&str> = ordered
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[tokio::test]
    async fn epic_delete_cascades_over_http() {
        let app = app();
        let epic = body_json(
            app.clone()
                .oneshot(post("/epics", json!({ "name": "Trip" })))
                .await
                .unwrap(),
        )
        .await;
        let subtask = body_json(
            app.clone()
                .oneshot(post(
                    "/subtasks",
                    json!({ "name": "Docs", "epic_id": epic["id"] }),
                ))
                .await
                .unwrap(),
        )
        .await;

        let response = app
            .clone()
            .oneshot(
                Request::delete(format!("/epics/{}", epic["id"]))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::get(format!("/subtasks/{}", subtask["id"]))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
