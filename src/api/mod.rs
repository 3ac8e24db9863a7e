//! HTTP API for the task board.
//!
//! ## Endpoints
//!
//! - `GET /tasks` - List all tasks
//! - `POST /tasks` - Create a task (201; 406 on time conflict)
//! - `GET /tasks/{id}` - Get a task (records it in history)
//! - `POST /tasks/{id}` - Replace a task (201; 404 unknown id)
//! - `DELETE /tasks/{id}` - Delete a task
//! - `DELETE /tasks` - Delete all tasks
//! - same shape under `/epics` and `/subtasks`
//! - `GET /epics/{id}/subtasks` - Subtasks of one epic
//! - `GET /history` - Recently fetched entities, oldest access first
//! - `GET /prioritized` - Timed entries ascending by start time
//! - `GET /health` - Health check

mod epics;
mod routes;
mod subtasks;
mod tasks;

pub use routes::{router, serve, AppState};
