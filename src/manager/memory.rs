//! In-memory task manager: the authoritative store and the facade that keeps
//! every invariant intact.
//!
//! Each public operation runs the same sequence: validate the schedule gate,
//! mutate the store, re-derive the owning epic when a subtask changed, and
//! record lookups in the history tracker. A failed conflict check commits
//! nothing.
//!
//! Not internally thread-safe: the host serializes access (the API layer
//! holds a single async lock around the whole manager).

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ManagerError, Result};
use crate::manager::aggregate;
use crate::manager::history::HistoryTracker;
use crate::manager::ids::IdGenerator;
use crate::manager::schedule::{ScheduleIndex, Slot};
use crate::manager::TaskManager;
use crate::model::{Epic, Subtask, Task, TaskId, TaskRecord, TaskStatus};

#[derive(Debug, Default)]
pub struct InMemoryTaskManager {
    ids: IdGenerator,
    tasks: HashMap<TaskId, Task>,
    epics: HashMap<TaskId, Epic>,
    subtasks: HashMap<TaskId, Subtask>,
    schedule: ScheduleIndex,
    history: HistoryTracker,
}

impl InMemoryTaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule gate. Entities without a full interval are exempt.
    fn check_slot(&self, own_id: Option<TaskId>, task: &Task) -> Result<()> {
        let (Some(start), Some(end)) = (task.start_time, task.end_time()) else {
            return Ok(());
        };
        self.schedule
            .validate(own_id, start, end)
            .map_err(|ids| ManagerError::TimeConflict { ids })
    }

    /// Sync the schedule index with an entity's current interval.
    fn index(&mut self, id: TaskId, task: &Task) {
        match (task.start_time, task.end_time()) {
            (Some(start), Some(end)) => self.schedule.insert(Slot { id, start, end }),
            _ => self.schedule.remove(id),
        }
    }

    /// Re-derive one epic's status and time span from its current subtasks.
    fn refresh_epic(&mut self, epic_id: TaskId) {
        let owned: Vec<Subtask> = self
            .subtasks
            .values()
            .filter(|subtask| subtask.epic_id == epic_id)
            .cloned()
            .collect();
        if let Some(epic) = self.epics.get_mut(&epic_id) {
            aggregate::refresh(epic, &owned);
        }
    }

    /// Insert a loaded record directly, preserving its id. Links and derived
    /// state are rebuilt afterwards by [`InMemoryTaskManager::relink`].
    pub(crate) fn restore(&mut self, record: TaskRecord) {
        match record {
            TaskRecord::Task(task) => {
                self.ids.observe(task.id);
                self.index(task.id, &task);
                self.tasks.insert(task.id, task);
            }
            TaskRecord::Epic(epic) => {
                self.ids.observe(epic.task.id);
                self.epics.insert(epic.task.id, epic);
            }
            TaskRecord::Subtask(subtask) => {
                self.ids.observe(subtask.task.id);
                self.index(subtask.task.id, &subtask.task);
                self.subtasks.insert(subtask.task.id, subtask);
            }
        }
    }

    /// Rebuild epic↔subtask links and derived epic state after a load.
    pub(crate) fn relink(&mut self) {
        let links: Vec<(TaskId, TaskId)> = self
            .subtasks
            .values()
            .map(|subtask| (subtask.epic_id, subtask.task.id))
            .collect();
        for (epic_id, subtask_id) in links {
            if let Some(epic) = self.epics.get_mut(&epic_id) {
                epic.add_subtask_id(subtask_id);
            }
        }
        let epic_ids: Vec<TaskId> = self.epics.keys().copied().collect();
        for epic_id in epic_ids {
            self.refresh_epic(epic_id);
        }
    }
}

impl TaskManager for InMemoryTaskManager {
    fn create_task(&mut self, mut task: Task) -> Result<Task> {
        self.check_slot(None, &task)?;
        task.id = self.ids.next_id();
        self.index(task.id, &task);
        self.tasks.insert(task.id, task.clone());
        debug!(id = %task.id, "created task");
        Ok(task)
    }

    fn create_epic(&mut self, mut epic: Epic) -> Result<Epic> {
        // Derived state is never taken from the caller.
        epic.task.id = self.ids.next_id();
        epic.task.status = TaskStatus::New;
        epic.task.start_time = None;
        epic.task.duration_minutes = Some(0);
        epic.end_time = None;
        epic.subtask_ids.clear();
        self.epics.insert(epic.task.id, epic.clone());
        debug!(id = %epic.task.id, "created epic");
        Ok(epic)
    }

    fn create_subtask(&mut self, mut subtask: Subtask) -> Result<Subtask> {
        if !self.epics.contains_key(&subtask.epic_id) {
            return Err(ManagerError::NotFound {
                id: subtask.epic_id,
            });
        }
        self.check_slot(None, &subtask.task)?;
        subtask.task.id = self.ids.next_id();
        self.subtasks.insert(subtask.task.id, subtask.clone());
        if let Some(epic) = self.epics.get_mut(&subtask.epic_id) {
            epic.add_subtask_id(subtask.task.id);
        }
        self.refresh_epic(subtask.epic_id);
        self.index(subtask.task.id, &subtask.task);
        debug!(id = %subtask.task.id, epic = %subtask.epic_id, "created subtask");
        Ok(subtask)
    }

    fn task(&mut self, id: TaskId) -> Option<Task> {
        let task = self.tasks.get(&id)?.clone();
        self.history.record(TaskRecord::Task(task.clone()));
        Some(task)
    }

    fn epic(&mut self, id: TaskId) -> Option<Epic> {
        let epic = self.epics.get(&id)?.clone();
        self.history.record(TaskRecord::Epic(epic.clone()));
        Some(epic)
    }

    fn subtask(&mut self, id: TaskId) -> Option<Subtask> {
        let subtask = self.subtasks.get(&id)?.clone();
        self.history.record(TaskRecord::Subtask(subtask.clone()));
        Some(subtask)
    }

    fn tasks(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    fn epics(&self) -> Vec<Epic> {
        self.epics.values().cloned().collect()
    }

    fn subtasks(&self) -> Vec<Subtask> {
        self.subtasks.values().cloned().collect()
    }

    fn update_task(&mut self, id: TaskId, mut task: Task) -> Result<Task> {
        if !self.tasks.contains_key(&id) {
            return Err(ManagerError::NotFound { id });
        }
        self.check_slot(Some(id), &task)?;
        task.id = id;
        self.index(id, &task);
        self.tasks.insert(id, task.clone());
        Ok(task)
    }

    fn update_epic(&mut self, id: TaskId, epic: Epic) -> Result<Epic> {
        let Some(existing) = self.epics.get_mut(&id) else {
            return Err(ManagerError::NotFound { id });
        };
        // Only the caller-settable fields are replaced; status, span and
        // subtask links are derived state.
        existing.task.name = epic.task.name;
        existing.task.description = epic.task.description;
        Ok(existing.clone())
    }

    fn update_subtask(&mut self, id: TaskId, mut subtask: Subtask) -> Result<Subtask> {
        let Some(previous) = self.subtasks.get(&id) else {
            return Err(ManagerError::NotFound { id });
        };
        let previous_epic = previous.epic_id;
        if !self.epics.contains_key(&subtask.epic_id) {
            return Err(ManagerError::NotFound {
                id: subtask.epic_id,
            });
        }
        self.check_slot(Some(id), &subtask.task)?;
        subtask.task.id = id;
        self.subtasks.insert(id, subtask.clone());
        if previous_epic != subtask.epic_id {
            if let Some(epic) = self.epics.get_mut(&previous_epic) {
                epic.remove_subtask_id(id);
            }
            if let Some(epic) = self.epics.get_mut(&subtask.epic_id) {
                epic.add_subtask_id(id);
            }
            self.refresh_epic(previous_epic);
        }
        self.refresh_epic(subtask.epic_id);
        self.index(id, &subtask.task);
        Ok(subtask)
    }

    fn delete_task(&mut self, id: TaskId) -> Result<Task> {
        let task = self.tasks.remove(&id).ok_or(ManagerError::NotFound { id })?;
        self.schedule.remove(id);
        self.history.remove(id);
        Ok(task)
    }

    fn delete_epic(&mut self, id: TaskId) -> Result<Epic> {
        let epic = self.epics.remove(&id).ok_or(ManagerError::NotFound { id })?;
        let owned: Vec<TaskId> = self
            .subtasks
            .values()
            .filter(|subtask| subtask.epic_id == id)
            .map(|subtask| subtask.task.id)
            .collect();
        for subtask_id in owned {
            self.subtasks.remove(&subtask_id);
            self.schedule.remove(subtask_id);
            self.history.remove(subtask_id);
        }
        self.history.remove(id);
        debug!(id = %id, "deleted epic with cascade");
        Ok(epic)
    }

    fn delete_subtask(&mut self, id: TaskId) -> Result<Subtask> {
        let subtask = self
            .subtasks
            .remove(&id)
            .ok_or(ManagerError::NotFound { id })?;
        self.schedule.remove(id);
        self.history.remove(id);
        if let Some(epic) = self.epics.get_mut(&subtask.epic_id) {
            epic.remove_subtask_id(id);
        }
        self.refresh_epic(subtask.epic_id);
        Ok(subtask)
    }

    fn delete_tasks(&mut self) -> Result<()> {
        let ids: Vec<TaskId> = self.tasks.keys().copied().collect();
        for id in ids {
            self.schedule.remove(id);
            self.history.remove(id);
        }
        self.tasks.clear();
        Ok(())
    }

    fn delete_epics(&mut self) -> Result<()> {
        let subtask_ids: Vec<TaskId> = self.subtasks.keys().copied().collect();
        for id in subtask_ids {
            self.schedule.remove(id);
            self.history.remove(id);
        }
        self.subtasks.clear();
        let epic_ids: Vec<TaskId> = self.epics.keys().copied().collect();
        for id in epic_ids {
            self.history.remove(id);
        }
        self.epics.clear();
        Ok(())
    }

    fn delete_subtasks(&mut self) -> Result<()> {
        let ids: Vec<TaskId> = self.subtasks.keys().copied().collect();
        for id in ids {
            self.schedule.remove(id);
            self.history.remove(id);
        }
        self.subtasks.clear();
        let epic_ids: Vec<TaskId> = self.epics.keys().copied().collect();
        for epic_id in epic_ids {
            if let Some(epic) = self.epics.get_mut(&epic_id) {
                epic.clear_subtask_ids();
            }
            self.refresh_epic(epic_id);
        }
        Ok(())
    }

    fn subtasks_of_epic(&self, epic_id: TaskId) -> Result<Vec<Subtask>> {
        if !self.epics.contains_key(&epic_id) {
            return Err(ManagerError::NotFound { id: epic_id });
        }
        Ok(self
            .subtasks
            .values()
            .filter(|subtask| subtask.epic_id == epic_id)
            .cloned()
            .collect())
    }

    fn history(&self) -> Vec<TaskRecord> {
        self.history.list()
    }

    fn prioritized(&self) -> Vec<TaskRecord> {
        self.schedule
            .snapshot()
            .into_iter()
            .filter_map(|slot| {
                self.tasks
                    .get(&slot.id)
                    .cloned()
                    .map(TaskRecord::Task)
                    .or_else(|| {
                        self.subtasks
                            .get(&slot.id)
                            .cloned()
                            .map(TaskRecord::Subtask)
                    })
            })
            .collect()
    }
}
