//! Derived epic state: a single fold over the epic's current subtasks.
//!
//! Re-run synchronously after every subtask create, update, delete and bulk
//! clear. Not iterative; one pass reaches the fixed point.

use chrono::{DateTime, Utc};

use crate::model::{Epic, Subtask, TaskStatus};

/// Time span folded from timed subtasks.
///
/// Subtasks without a start time contribute nothing, including their
/// duration; with no timed subtasks at all the span is undefined and the
/// duration is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpicSpan {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: u32,
}

/// Epic status law:
/// - any IN_PROGRESS subtask makes the epic IN_PROGRESS (short-circuit),
/// - zero subtasks or all NEW makes it NEW,
/// - all DONE (and at least one subtask) makes it DONE,
/// - a mixed NEW/DONE split makes it IN_PROGRESS.
pub fn epic_status<'a, I>(subtasks: I) -> TaskStatus
where
    I: IntoIterator<Item = &'a Subtask>,
{
    let mut total = 0usize;
    let mut new = 0usize;
    let mut done = 0usize;
    for subtask in subtasks {
        total += 1;
        match subtask.task.status {
            TaskStatus::InProgress => return TaskStatus::InProgress,
            TaskStatus::New => new += 1,
            TaskStatus::Done => done += 1,
        }
    }
    if total == 0 || new == total {
        TaskStatus::New
    } else if done == total {
        TaskStatus::Done
    } else {
        TaskStatus::InProgress
    }
}

/// Minimum start, maximum end and summed duration over timed subtasks.
pub fn epic_span<'a, I>(subtasks: I) -> EpicSpan
where
    I: IntoIterator<Item = &'a Subtask>,
{
    let mut start_time: Option<DateTime<Utc>> = None;
    let mut end_time: Option<DateTime<Utc>> = None;
    let mut duration_minutes = 0u32;

    for subtask in subtasks {
        let Some(start) = subtask.task.start_time else {
            continue;
        };
        start_time = Some(start_time.map_or(start, |current| current.min(start)));
        if let Some(end) = subtask.task.end_time() {
            end_time = Some(end_time.map_or(end, |current| current.max(end)));
        }
        duration_minutes += subtask.task.duration_minutes.unwrap_or(0);
    }

    EpicSpan {
        start_time,
        end_time,
        duration_minutes,
    }
}

/// Overwrite an epic's derived fields from its subtasks.
pub fn refresh<'a, I>(epic: &mut Epic, subtasks: I)
where
    I: IntoIterator<Item = &'a Subtask> + Clone,
{
    epic.task.status = epic_status(subtasks.clone());
    let span = epic_span(subtasks);
    epic.task.start_time = span.start_time;
    epic.end_time = span.end_time;
    epic.task.duration_minutes = Some(span.duration_minutes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskId;
    use chrono::TimeZone;

    fn subtask(status: TaskStatus) -> Subtask {
        let mut subtask = Subtask::new("s", "", TaskId(1));
        subtask.task.status = status;
        subtask
    }

    fn timed_subtask(hour: u32, minute: u32, duration: u32) -> Subtask {
        let mut subtask = Subtask::new("s", "", TaskId(1));
        subtask.task.start_time = Some(Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap());
        subtask.task.duration_minutes = Some(duration);
        subtask
    }

    #[test]
    fn empty_epic_is_new() {
        let subtasks: Vec<Subtask> = Vec::new();
        assert_eq!(epic_status(&subtasks), TaskStatus::New);
    }

    #[test]
    fn all_done_is_done() {
        let subtasks = vec![subtask(TaskStatus::Done), subtask(TaskStatus::Done)];
        assert_eq!(epic_status(&subtasks), TaskStatus::Done);
    }

    #[test]
    fn mixed_new_and_done_is_in_progress() {
        let subtasks = vec![subtask(TaskStatus::New), subtask(TaskStatus::Done)];
        assert_eq!(epic_status(&subtasks), TaskStatus::InProgress);
    }

    #[test]
    fn any_in_progress_wins() {
        let subtasks = vec![subtask(TaskStatus::Done), subtask(TaskStatus::InProgress)];
        assert_eq!(epic_status(&subtasks), TaskStatus::InProgress);
    }

    #[test]
    fn all_new_is_new() {
        let subtasks = vec![subtask(TaskStatus::New), subtask(TaskStatus::New)];
        assert_eq!(epic_status(&subtasks), TaskStatus::New);
    }

    #[test]
    fn span_over_timed_subtasks() {
        let subtasks = vec![timed_subtask(10, 0, 30), timed_subtask(9, 0, 45)];
        let span = epic_span(&subtasks);
        assert_eq!(
            span.start_time,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(
            span.end_time,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap())
        );
        assert_eq!(span.duration_minutes, 75);
    }

    #[test]
    fn untimed_subtasks_are_skipped_entirely() {
        let mut untimed = subtask(TaskStatus::New);
        untimed.task.duration_minutes = Some(500);
        let subtasks = vec![untimed, timed_subtask(12, 0, 15)];
        let span = epic_span(&subtasks);
        assert_eq!(span.duration_minutes, 15);
        assert_eq!(
            span.start_time,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn no_timed_subtasks_means_no_span_and_zero_duration() {
        let subtasks = vec![subtask(TaskStatus::New)];
        let span = epic_span(&subtasks);
        assert_eq!(span.start_time, None);
        assert_eq!(span.end_time, None);
        assert_eq!(span.duration_minutes, 0);
    }
}
