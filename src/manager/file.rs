//! File-backed task manager: delegates to the in-memory manager and mirrors
//! every mutation to a line-oriented record file.
//!
//! One header line, then one comma-separated record per entity:
//! `id,type,name,status,description,epic,duration,start` where `epic` is the
//! owning epic id for subtasks (empty otherwise), `duration` is whole minutes
//! (empty when unset) and `start` is RFC 3339 or the literal `null`. Names
//! and descriptions must not contain commas or newlines.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{ManagerError, Result};
use crate::manager::memory::InMemoryTaskManager;
use crate::manager::TaskManager;
use crate::model::{Epic, Subtask, Task, TaskId, TaskRecord, TaskStatus};

const HEADER: &str = "id,type,name,status,description,epic,duration,start";

#[derive(Debug)]
pub struct FileBackedTaskManager {
    inner: InMemoryTaskManager,
    path: PathBuf,
}

impl FileBackedTaskManager {
    /// Open a store at `path`: load it when the file exists, otherwise create
    /// an empty one. Loading restores the id generator to the maximum id seen
    /// and rebuilds links, derived epic state and the schedule index. Loaded
    /// records do not enter the history.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut manager = Self {
            inner: InMemoryTaskManager::new(),
            path,
        };
        if manager.path.exists() {
            manager.load()?;
            debug!(path = %manager.path.display(), "loaded task file");
        } else {
            if let Some(dir) = manager.path.parent() {
                if !dir.as_os_str().is_empty() {
                    fs::create_dir_all(dir)?;
                }
            }
            manager.save()?;
        }
        Ok(manager)
    }

    fn load(&mut self) -> Result<()> {
        let text = fs::read_to_string(&self.path)?;
        for line in text.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            self.inner.restore(parse_record(line)?);
        }
        self.inner.relink();
        Ok(())
    }

    /// Rewrite the whole file. Written to a sibling temp file first so a
    /// failed write never truncates the existing one.
    fn save(&self) -> Result<()> {
        let mut out = String::from(HEADER);
        out.push('\n');
        for task in self.inner.tasks() {
            out.push_str(&render_record(&TaskRecord::Task(task)));
            out.push('\n');
        }
        for epic in self.inner.epics() {
            out.push_str(&render_record(&TaskRecord::Epic(epic)));
            out.push('\n');
        }
        for subtask in self.inner.subtasks() {
            out.push_str(&render_record(&TaskRecord::Subtask(subtask)));
            out.push('\n');
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, out)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn render_record(record: &TaskRecord) -> String {
    let (kind, task, epic_ref) = match record {
        TaskRecord::Task(task) => ("TASK", task, String::new()),
        TaskRecord::Epic(epic) => ("EPIC", &epic.task, String::new()),
        TaskRecord::Subtask(subtask) => ("SUBTASK", &subtask.task, subtask.epic_id.to_string()),
    };
    let duration = task
        .duration_minutes
        .map(|minutes| minutes.to_string())
        .unwrap_or_default();
    let start = task
        .start_time
        .map(|start| start.to_rfc3339())
        .unwrap_or_else(|| "null".to_string());
    format!(
        "{},{},{},{},{},{},{},{}",
        task.id, kind, task.name, task.status, task.description, epic_ref, duration, start
    )
}

fn parse_record(line: &str) -> Result<TaskRecord> {
    let invalid = || ManagerError::InvalidRecord {
        line: line.to_string(),
    };
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() != 8 {
        return Err(invalid());
    }
    let id = TaskId(parts[0].parse().map_err(|_| invalid())?);
    let status = TaskStatus::parse(parts[3]).ok_or_else(invalid)?;
    let duration_minutes = if parts[6].is_empty() {
        None
    } else {
        Some(parts[6].parse().map_err(|_| invalid())?)
    };
    let start_time = match parts[7] {
        "null" => None,
        raw => Some(
            DateTime::parse_from_rfc3339(raw)
                .map_err(|_| invalid())?
                .with_timezone(&Utc),
        ),
    };
    let task = Task {
        id,
        name: parts[2].to_string(),
        description: parts[4].to_string(),
        status,
        duration_minutes,
        start_time,
    };
    match parts[1] {
        "TASK" => Ok(TaskRecord::Task(task)),
        "EPIC" => Ok(TaskRecord::Epic(Epic {
            task,
            subtask_ids: Vec::new(),
            end_time: None,
        })),
        "SUBTASK" => {
            let epic_id = TaskId(parts[5].parse().map_err(|_| invalid())?);
            Ok(TaskRecord::Subtask(Subtask { task, epic_id }))
        }
        _ => Err(invalid()),
    }
}

impl TaskManager for FileBackedTaskManager {
    fn create_task(&mut self, task: Task) -> Result<Task> {
        let created = self.inner.create_task(task)?;
        self.save()?;
        Ok(created)
    }

    fn create_epic(&mut self, epic: Epic) -> Result<Epic> {
        let created = self.inner.create_epic(epic)?;
        self.save()?;
        Ok(created)
    }

    fn create_subtask(&mut self, subtask: Subtask) -> Result<Subtask> {
        let created = self.inner.create_subtask(subtask)?;
        self.save()?;
        Ok(created)
    }

    fn task(&mut self, id: TaskId) -> Option<Task> {
        self.inner.task(id)
    }

    fn epic(&mut self, id: TaskId) -> Option<Epic> {
        self.inner.epic(id)
    }

    fn subtask(&mut self, id: TaskId) -> Option<Subtask> {
        self.inner.subtask(id)
    }

    fn tasks(&self) -> Vec<Task> {
        self.inner.tasks()
    }

    fn epics(&self) -> Vec<Epic> {
        self.inner.epics()
    }

    fn subtasks(&self) -> Vec<Subtask> {
        self.inner.subtasks()
    }

    fn update_task(&mut self, id: TaskId, task: Task) -> Result<Task> {
        let updated = self.inner.update_task(id, task)?;
        self.save()?;
        Ok(updated)
    }

    fn update_epic(&mut self, id: TaskId, epic: Epic) -> Result<Epic> {
        let updated = self.inner.update_epic(id, epic)?;
        self.save()?;
        Ok(updated)
    }

    fn update_subtask(&mut self, id: TaskId, subtask: Subtask) -> Result<Subtask> {
        let updated = self.inner.update_subtask(id, subtask)?;
        self.save()?;
        Ok(updated)
    }

    fn delete_task(&mut self, id: TaskId) -> Result<Task> {
        let deleted = self.inner.delete_task(id)?;
        self.save()?;
        Ok(deleted)
    }

    fn delete_epic(&mut self, id: TaskId) -> Result<Epic> {
        let deleted = self.inner.delete_epic(id)?;
        self.save()?;
        Ok(deleted)
    }

    fn delete_subtask(&mut self, id: TaskId) -> Result<Subtask> {
        let deleted = self.inner.delete_subtask(id)?;
        self.save()?;
        Ok(deleted)
    }

    fn delete_tasks(&mut self) -> Result<()> {
        self.inner.delete_tasks()?;
        self.save()
    }

    fn delete_epics(&mut self) -> Result<()> {
        self.inner.delete_epics()?;
        self.save()
    }

    fn delete_subtasks(&mut self) -> Result<()> {
        self.inner.delete_subtasks()?;
        self.save()
    }

    fn subtasks_of_epic(&self, epic_id: TaskId) -> Result<Vec<Subtask>> {
        self.inner.subtasks_of_epic(epic_id)
    }

    fn history(&self) -> Vec<TaskRecord> {
        self.inner.history()
    }

    fn prioritized(&self) -> Vec<TaskRecord> {
        self.inner.prioritized()
    }
}
