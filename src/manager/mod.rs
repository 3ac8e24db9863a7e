//! Task manager backends.
//!
//! - `memory`: in-memory only (non-persistent)
//! - `file`: in-memory mirrored to a flat record file after every mutation
//!
//! The trait is synchronous on purpose: the core is a sequence of
//! single-writer operations against shared structures, and the HTTP layer
//! serializes callers with one async lock around the whole manager.

pub mod aggregate;
mod file;
mod history;
mod ids;
mod memory;
mod schedule;

pub use file::FileBackedTaskManager;
pub use history::HistoryTracker;
pub use ids::IdGenerator;
pub use memory::InMemoryTaskManager;
pub use schedule::{ScheduleIndex, Slot};

use std::path::PathBuf;

use crate::error::Result;
use crate::model::{Epic, Subtask, Task, TaskId, TaskRecord};

/// The facade every caller goes through. Each operation leaves all
/// invariants intact and is atomic from the caller's perspective.
pub trait TaskManager: Send {
    /// Create a task with a freshly issued id. Timed tasks pass the schedule
    /// gate first; on conflict nothing is committed.
    fn create_task(&mut self, task: Task) -> Result<Task>;
    /// Create an epic. Client-supplied status/time/subtask links are ignored;
    /// derived state starts empty.
    fn create_epic(&mut self, epic: Epic) -> Result<Epic>;
    /// Create a subtask under a live epic (`NotFound` otherwise), link it and
    /// re-derive the epic.
    fn create_subtask(&mut self, subtask: Subtask) -> Result<Subtask>;

    /// Lookups return `None` for unknown ids and record a snapshot of the hit
    /// in the history tracker.
    fn task(&mut self, id: TaskId) -> Option<Task>;
    fn epic(&mut self, id: TaskId) -> Option<Epic>;
    fn subtask(&mut self, id: TaskId) -> Option<Subtask>;

    fn tasks(&self) -> Vec<Task>;
    fn epics(&self) -> Vec<Epic>;
    fn subtasks(&self) -> Vec<Subtask>;

    /// Full replacement keyed by `id`; the payload's own id is overwritten.
    /// Unknown ids fail with `NotFound` rather than creating a record.
    fn update_task(&mut self, id: TaskId, task: Task) -> Result<Task>;
    fn update_epic(&mut self, id: TaskId, epic: Epic) -> Result<Epic>;
    fn update_subtask(&mut self, id: TaskId, subtask: Subtask) -> Result<Subtask>;

    /// Remove and return the entity. Epic deletion cascades to its subtasks
    /// in the store, the schedule index and the history.
    fn delete_task(&mut self, id: TaskId) -> Result<Task>;
    fn delete_epic(&mut self, id: TaskId) -> Result<Epic>;
    fn delete_subtask(&mut self, id: TaskId) -> Result<Subtask>;

    fn delete_tasks(&mut self) -> Result<()>;
    fn delete_epics(&mut self) -> Result<()>;
    fn delete_subtasks(&mut self) -> Result<()>;

    fn subtasks_of_epic(&self, epic_id: TaskId) -> Result<Vec<Subtask>>;

    /// Fetch history, oldest access first.
    fn history(&self) -> Vec<TaskRecord>;
    /// Timed entries ascending by start time.
    fn prioritized(&self) -> Vec<TaskRecord>;
}

/// Backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Memory,
    File,
}

impl StoreKind {
    /// Parse from a configuration value; anything unrecognized falls back to
    /// the default.
    pub fn from_str(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "file" | "csv" => Self::File,
            "memory" | "mem" => Self::Memory,
            _ => Self::default(),
        }
    }
}

/// Create a task manager for the configured backend.
pub fn create_task_manager(kind: StoreKind, path: PathBuf) -> Result<Box<dyn TaskManager>> {
    match kind {
        StoreKind::Memory => Ok(Box::new(InMemoryTaskManager::new())),
        StoreKind::File => Ok(Box::new(FileBackedTaskManager::open(path)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_kind_parses_with_fallback() {
        assert_eq!(StoreKind::from_str("file"), StoreKind::File);
        assert_eq!(StoreKind::from_str("CSV"), StoreKind::File);
        assert_eq!(StoreKind::from_str("memory"), StoreKind::Memory);
        assert_eq!(StoreKind::from_str("???"), StoreKind::Memory);
    }
}
