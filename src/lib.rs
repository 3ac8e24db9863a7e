//! # taskboard
//!
//! A personal task tracker: atomic tasks, epics that aggregate subtasks, a
//! globally ordered schedule with overlap validation, and a
//! most-recently-used history of fetched entities. State lives in memory and
//! can be mirrored to a flat record file.
//!
//! ## Modules
//! - `model`: tasks, epics, subtasks and the tagged record type
//! - `manager`: the task manager facade with memory and file backends
//! - `api`: axum HTTP surface over the manager
//! - `config`: environment-driven server configuration

pub mod api;
pub mod config;
pub mod error;
pub mod manager;
pub mod model;

pub use config::Config;
pub use error::ManagerError;
pub use manager::{FileBackedTaskManager, InMemoryTaskManager, StoreKind, TaskManager};
