//! Schedule index: a total order over timed tasks and subtasks plus the
//! overlap gate run before any timed entity is committed.
//!
//! Only entities with both a start time and a duration become entries;
//! everything else is exempt from validation and never inserted. Epics are
//! never indexed, only their subtasks.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::model::TaskId;

/// One indexed entry: the half-open interval `[start, end)` of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub id: TaskId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ScheduleIndex {
    /// Ascending by start time; the id in the key is a stable tie-break.
    ordered: BTreeMap<(DateTime<Utc>, TaskId), Slot>,
    /// Start an id was inserted under, so removal works after the entity's
    /// fields have changed.
    starts: HashMap<TaskId, DateTime<Utc>>,
}

impl ScheduleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a candidate interval against every entry.
    ///
    /// Two intervals `[s1, e1)` and `[s2, e2)` conflict iff `s1 < e2 && s2 < e1`:
    /// back-to-back entries are fine, identical starts and any overlap are
    /// not. The candidate's own id is skipped so re-saving an entity into the
    /// slot it already occupies passes. On conflict the full colliding id set
    /// is returned.
    pub fn validate(
        &self,
        own_id: Option<TaskId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), Vec<TaskId>> {
        let conflicts: Vec<TaskId> = self
            .ordered
            .values()
            .filter(|slot| own_id != Some(slot.id))
            .filter(|slot| slot.start < end && start < slot.end)
            .map(|slot| slot.id)
            .collect();
        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(conflicts)
        }
    }

    /// Insert or re-slot an entry. An existing entry for the id is dropped
    /// first, so updates cannot leave a stale interval behind.
    pub fn insert(&mut self, slot: Slot) {
        self.remove(slot.id);
        self.starts.insert(slot.id, slot.start);
        self.ordered.insert((slot.start, slot.id), slot);
    }

    /// Remove by identity. No-op for ids that were never indexed.
    pub fn remove(&mut self, id: TaskId) {
        if let Some(start) = self.starts.remove(&id) {
            self.ordered.remove(&(start, id));
        }
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.starts.contains_key(&id)
    }

    /// Current entries, ascending by start time.
    pub fn snapshot(&self) -> Vec<Slot> {
        self.ordered.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
    }

    fn slot(id: u64, start: DateTime<Utc>, minutes: i64) -> Slot {
        Slot {
            id: TaskId(id),
            start,
            end: start + chrono::Duration::minutes(minutes),
        }
    }

    #[test]
    fn snapshot_orders_by_start_time() {
        let mut index = ScheduleIndex::new();
        index.insert(slot(1, at(10, 0), 30));
        index.insert(slot(2, at(9, 0), 45));
        index.insert(slot(3, at(11, 0), 15));
        let ids: Vec<TaskId> = index.snapshot().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![TaskId(2), TaskId(1), TaskId(3)]);
    }

    #[test]
    fn back_to_back_does_not_conflict() {
        let mut index = ScheduleIndex::new();
        index.insert(slot(1, at(12, 30), 5));
        // Ends exactly when the indexed entry starts.
        assert!(index.validate(None, at(12, 25), at(12, 30)).is_ok());
        // And starts exactly when it ends.
        assert!(index.validate(None, at(12, 35), at(12, 40)).is_ok());
    }

    #[test]
    fn partial_overlap_conflicts() {
        let mut index = ScheduleIndex::new();
        index.insert(slot(1, at(12, 30), 5));
        let conflicts = index.validate(None, at(12, 27), at(12, 32)).unwrap_err();
        assert_eq!(conflicts, vec![TaskId(1)]);
    }

    #[test]
    fn identical_starts_conflict() {
        let mut index = ScheduleIndex::new();
        index.insert(slot(1, at(12, 30), 5));
        assert!(index.validate(None, at(12, 30), at(12, 35)).is_err());
    }

    #[test]
    fn containment_conflicts_both_ways() {
        let mut index = ScheduleIndex::new();
        index.insert(slot(1, at(10, 0), 60));
        assert!(index.validate(None, at(10, 10), at(10, 20)).is_err());
        assert!(index.validate(None, at(9, 0), at(12, 0)).is_err());
    }

    #[test]
    fn validation_skips_own_id() {
        let mut index = ScheduleIndex::new();
        index.insert(slot(1, at(12, 30), 5));
        assert!(index
            .validate(Some(TaskId(1)), at(12, 30), at(12, 35))
            .is_ok());
    }

    #[test]
    fn conflict_lists_every_colliding_id() {
        let mut index = ScheduleIndex::new();
        index.insert(slot(1, at(10, 0), 30));
        index.insert(slot(2, at(10, 30), 30));
        let conflicts = index.validate(None, at(10, 15), at(10, 45)).unwrap_err();
        assert_eq!(conflicts, vec![TaskId(1), TaskId(2)]);
    }

    #[test]
    fn removal_is_keyed_by_id() {
        let mut index = ScheduleIndex::new();
        index.insert(slot(1, at(10, 0), 30));
        // Re-slotting under a new start keeps a single entry.
        index.insert(slot(1, at(14, 0), 30));
        assert_eq!(index.len(), 1);
        index.remove(TaskId(1));
        assert!(index.is_empty());
        // Removing an unknown id is a no-op.
        index.remove(TaskId(99));
    }
}
