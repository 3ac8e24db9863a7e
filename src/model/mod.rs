//! Domain model: tasks, epics and subtasks.
//!
//! The three entity kinds share their common fields through composition:
//! `Epic` and `Subtask` embed a [`Task`] (serde-flattened, so the JSON and
//! file representations stay flat) instead of inheriting from it.
//!
//! # Invariants
//! - `id` is assigned once by the manager and never changes afterwards.
//! - An epic's status and time span are derived from its subtasks; clients
//!   cannot set them directly.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a task, epic or subtask.
///
/// Issued as a strictly increasing integer by the manager's id generator.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a task in its lifecycle.
///
/// Tasks and subtasks move freely between statuses via replacement; epic
/// status is derived only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    New,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::New => "NEW",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }

    /// Parse the wire/file spelling. Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NEW" => Some(TaskStatus::New),
            "IN_PROGRESS" => Some(TaskStatus::InProgress),
            "DONE" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An atomic unit of work, and the common core of epics and subtasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    /// Non-negative span in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: TaskId::default(),
            name: name.into(),
            description: description.into(),
            status: TaskStatus::New,
            duration_minutes: None,
            start_time: None,
        }
    }

    /// End instant: `start + duration` when both are present, else undefined.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        match (self.start_time, self.duration_minutes) {
            (Some(start), Some(minutes)) => Some(start + Duration::minutes(i64::from(minutes))),
            _ => None,
        }
    }
}

/// A container of subtasks. Status, start, end and duration are derived
/// from the current subtasks and overwritten after every subtask mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epic {
    #[serde(flatten)]
    pub task: Task,
    /// Owned subtask ids in insertion order, no duplicates.
    #[serde(default)]
    pub subtask_ids: Vec<TaskId>,
    /// Latest end among timed subtasks. Stored because an epic's duration is
    /// a sum, so its end is not `start + duration`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl Epic {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            task: Task::new(name, description),
            subtask_ids: Vec::new(),
            end_time: None,
        }
    }

    pub fn id(&self) -> TaskId {
        self.task.id
    }

    pub fn add_subtask_id(&mut self, id: TaskId) {
        if !self.subtask_ids.contains(&id) {
            self.subtask_ids.push(id);
        }
    }

    pub fn remove_subtask_id(&mut self, id: TaskId) {
        self.subtask_ids.retain(|existing| *existing != id);
    }

    pub fn clear_subtask_ids(&mut self) {
        self.subtask_ids.clear();
    }
}

/// A unit of work owned by exactly one epic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    #[serde(flatten)]
    pub task: Task,
    pub epic_id: TaskId,
}

impl Subtask {
    pub fn new(name: impl Into<String>, description: impl Into<String>, epic_id: TaskId) -> Self {
        Self {
            task: Task::new(name, description),
            epic_id,
        }
    }

    pub fn id(&self) -> TaskId {
        self.task.id
    }
}

/// Any of the three entity kinds, tagged. Used for history snapshots, the
/// prioritized view and the flat-file codec; rendering switches on the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskRecord {
    Task(Task),
    Epic(Epic),
    Subtask(Subtask),
}

impl TaskRecord {
    pub fn id(&self) -> TaskId {
        match self {
            TaskRecord::Task(task) => task.id,
            TaskRecord::Epic(epic) => epic.task.id,
            TaskRecord::Subtask(subtask) => subtask.task.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TaskRecord::Task(task) => &task.name,
            TaskRecord::Epic(epic) => &epic.task.name,
            TaskRecord::Subtask(subtask) => &subtask.task.name,
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self {
            TaskRecord::Task(task) => task.status,
            TaskRecord::Epic(epic) => epic.task.status,
            TaskRecord::Subtask(subtask) => subtask.task.status,
        }
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        match self {
            TaskRecord::Task(task) => task.start_time,
            TaskRecord::Epic(epic) => epic.task.start_time,
            TaskRecord::Subtask(subtask) => subtask.task.start_time,
        }
    }
}
