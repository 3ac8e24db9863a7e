//! Error types shared by the task manager backends.

use thiserror::Error;

use crate::model::TaskId;

/// Failures surfaced by manager operations.
///
/// A lookup that finds nothing is `Option::None`, not an error; `NotFound`
/// is reserved for writes and deletes that reference an id the store does
/// not hold.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("No entity with id {id}")]
    NotFound { id: TaskId },

    /// The candidate's time interval overlaps existing schedule entries.
    /// Carries every colliding id, not just the first.
    #[error("Time conflict with entries {ids:?}")]
    TimeConflict { ids: Vec<TaskId> },

    /// A persistence line could not be decoded. Fatal to the load.
    #[error("Malformed record: {line}")]
    InvalidRecord { line: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ManagerError>;
