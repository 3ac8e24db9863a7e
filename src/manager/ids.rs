//! Identity generation for all entity kinds.

use crate::model::TaskId;

/// Issues strictly increasing unique ids.
///
/// Owned by the in-memory manager rather than living in a global; a reload
/// raises the high-water mark via [`IdGenerator::observe`] so restored ids
/// are never reissued.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> TaskId {
        self.last += 1;
        TaskId(self.last)
    }

    /// Note an externally assigned id (from a loaded record).
    pub fn observe(&mut self, id: TaskId) {
        self.last = self.last.max(id.0);
    }
}
