use chrono::{Local, NaiveDateTime};
use tracing::debug;

use crate::error::SessionError;
use crate::model::task::Task;
use crate::types::{SessionStatus, TaskStatus};

/// A goal's breakdown plus execution progress.
///
/// `cursor` always lies in `0..=tasks.len()`, and the session is
/// `Completed` exactly when the cursor has passed the last task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
    goal: String,
    time_budget: u32,
    status: SessionStatus,
    cursor: usize,
    created_at: NaiveDateTime,
    tasks: Vec<Task>,
}

impl Session {
    pub fn new(goal: impl Into<String>, time_budget: u32, tasks: Vec<Task>) -> Self {
        let mut session = Self {
            id: uuid::Uuid::new_v4().to_string(),
            goal: goal.into(),
            time_budget,
            status: SessionStatus::InProgress,
            cursor: 0,
            created_at: Local::now().naive_local(),
            tasks,
        };
        session.renumber();
        session.sync_status();
        session
    }

    /// Rebuild a session from persisted fields, checking the cursor invariant.
    ///
    /// A cursor sitting past the last task on an unfinished record is
    /// normalized to `Completed`; a completed record whose cursor has not
    /// reached the end is rejected.
    pub(crate) fn restore(
        id: String,
        goal: String,
        time_budget: u32,
        status: SessionStatus,
        cursor: usize,
        created_at: NaiveDateTime,
        tasks: Vec<Task>,
    ) -> Result<Self, SessionError> {
        let inconsistent = |reason: String| SessionError::Inconsistent {
            id: id.clone(),
            reason,
        };
        if cursor > tasks.len() {
            return Err(inconsistent(format!(
                "cursor {cursor} is beyond {} task(s)",
                tasks.len()
            )));
        }
        if tasks.iter().any(|t| t.duration_minutes() == 0) {
            return Err(inconsistent("task with zero-minute duration".into()));
        }
        if status == SessionStatus::Completed && cursor < tasks.len() {
            return Err(inconsistent(format!(
                "marked completed with cursor {cursor} of {}",
                tasks.len()
            )));
        }
        let mut session = Self {
            id,
            goal,
            time_budget,
            status,
            cursor,
            created_at,
            tasks,
        };
        session.sync_status();
        Ok(session)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn time_budget(&self) -> u32 {
        self.time_budget
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.tasks.get(self.cursor)
    }

    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    pub fn completed_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status() == TaskStatus::Completed)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status() == TaskStatus::Skipped)
            .count()
    }

    pub fn total_minutes(&self) -> u64 {
        self.tasks
            .iter()
            .map(|t| u64::from(t.duration_minutes()))
            .sum()
    }

    /// Move past the current task. Returns `false` if the session was
    /// already complete.
    pub fn advance(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.cursor += 1;
        self.sync_status();
        debug!(session = %self.id, cursor = self.cursor, status = self.status.as_str(), "advanced");
        true
    }

    pub fn complete_current(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        let Some(task) = self.tasks.get_mut(self.cursor) else {
            return false;
        };
        task.complete();
        self.advance()
    }

    pub fn skip_current(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        let Some(task) = self.tasks.get_mut(self.cursor) else {
            return false;
        };
        task.skip();
        self.advance()
    }

    /// Leave the current task pending and park the session.
    pub fn pause(&mut self) {
        if !self.is_finished() {
            self.status = SessionStatus::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.status == SessionStatus::Paused {
            self.status = SessionStatus::InProgress;
        }
    }

    /// Swap in a new breakdown without touching cursor or status.
    pub fn regenerate_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.renumber();
        if self.cursor > self.tasks.len() {
            self.cursor = self.tasks.len();
        }
        self.sync_status();
    }

    /// Give the current task more time. Does not advance.
    pub fn extend_current_task(&mut self, extra_minutes: u32) -> bool {
        if extra_minutes == 0 || self.is_finished() {
            return false;
        }
        match self.tasks.get_mut(self.cursor) {
            Some(task) => {
                task.extend(extra_minutes);
                true
            }
            None => false,
        }
    }

    pub fn set_task_duration(&mut self, ordinal: u32, minutes: u32) -> Result<(), SessionError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.ordinal() == ordinal)
            .ok_or(SessionError::UnknownTask(ordinal))?;
        task.set_duration(minutes)?;
        Ok(())
    }

    fn renumber(&mut self) {
        for (i, task) in self.tasks.iter_mut().enumerate() {
            task.renumber(i as u32 + 1);
        }
    }

    fn sync_status(&mut self) {
        if self.cursor >= self.tasks.len() {
            self.status = SessionStatus::Completed;
        } else if self.status == SessionStatus::Completed {
            self.status = SessionStatus::InProgress;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;

    fn three_tasks() -> Vec<Task> {
        vec![
            Task::new(1, "Task 1", 10),
            Task::new(2, "Task 2", 20),
            Task::new(3, "Task 3", 15),
        ]
    }

    #[test]
    fn new_session_starts_in_progress_at_first_task() {
        let session = Session::new("Study math", 60, three_tasks());
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.current_task().unwrap().description(), "Task 1");
        assert!(uuid::Uuid::parse_str(session.id()).is_ok());
    }

    #[test]
    fn new_session_renumbers_tasks_by_position() {
        let tasks = vec![Task::new(7, "a", 1), Task::new(7, "b", 1)];
        let session = Session::new("goal", 2, tasks);
        let ordinals: Vec<u32> = session.tasks().iter().map(Task::ordinal).collect();
        assert_eq!(ordinals, vec![1, 2]);
    }

    #[test]
    fn advancing_through_every_task_completes_session() {
        let mut session = Session::new("Study math", 60, three_tasks());
        for step in 1..=3 {
            assert!(session.advance());
            assert_eq!(session.cursor(), step);
        }
        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(session.current_task().is_none());
    }

    #[test]
    fn advance_past_end_is_noop() {
        let mut session = Session::new("Study math", 60, three_tasks());
        for _ in 0..3 {
            session.advance();
        }
        assert!(!session.advance());
        assert_eq!(session.cursor(), 3);
    }

    #[test]
    fn complete_and_skip_resolve_then_advance_once() {
        let mut session = Session::new("Study math", 60, three_tasks());
        assert!(session.complete_current());
        assert!(session.skip_current());
        assert_eq!(session.cursor(), 2);
        assert_eq!(session.tasks()[0].status(), TaskStatus::Completed);
        assert_eq!(session.tasks()[1].status(), TaskStatus::Skipped);
        assert_eq!(session.tasks()[2].status(), TaskStatus::Pending);
        assert_eq!(session.completed_count(), 1);
        assert_eq!(session.skipped_count(), 1);
    }

    #[test]
    fn pause_keeps_cursor_and_leaves_current_pending() {
        let mut session = Session::new("Study math", 60, three_tasks());
        session.complete_current();
        session.pause();
        assert_eq!(session.status(), SessionStatus::Paused);
        assert_eq!(session.cursor(), 1);
        assert!(session.current_task().unwrap().is_pending());
        session.resume();
        assert_eq!(session.status(), SessionStatus::InProgress);
    }

    #[test]
    fn pause_does_not_reopen_completed_session() {
        let mut session = Session::new("goal", 5, vec![Task::new(1, "only", 5)]);
        session.complete_current();
        session.pause();
        assert_eq!(session.status(), SessionStatus::Completed);
    }

    #[test]
    fn regenerate_replaces_tasks_without_moving_cursor() {
        let mut session = Session::new("Study math", 60, three_tasks());
        session.pause();
        session.regenerate_tasks(vec![Task::new(9, "New A", 30), Task::new(9, "New B", 30)]);
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.status(), SessionStatus::Paused);
        assert_eq!(session.tasks().len(), 2);
        assert_eq!(session.tasks()[1].ordinal(), 2);
    }

    #[test]
    fn regenerate_clamps_cursor_to_new_length() {
        let mut session = Session::new("Study math", 60, three_tasks());
        session.advance();
        session.advance();
        session.regenerate_tasks(vec![Task::new(1, "only", 60)]);
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.status(), SessionStatus::Completed);
    }

    #[test]
    fn extend_adds_minutes_without_advancing() {
        let mut session = Session::new("Study math", 60, three_tasks());
        assert!(session.extend_current_task(5));
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.current_task().unwrap().duration_minutes(), 15);
        assert!(!session.extend_current_task(0));
    }

    #[test]
    fn total_minutes_does_not_overflow_after_saturating_extend() {
        let mut session = Session::new(
            "marathon",
            10,
            vec![Task::new(1, "a", 5), Task::new(2, "b", 5)],
        );
        assert_eq!(session.total_minutes(), 10);
        assert!(session.extend_current_task(u32::MAX));
        assert_eq!(session.total_minutes(), u64::from(u32::MAX) + 5);
    }

    #[test]
    fn set_task_duration_validates() {
        let mut session = Session::new("Study math", 60, three_tasks());
        session.set_task_duration(2, 25).unwrap();
        assert_eq!(session.tasks()[1].duration_minutes(), 25);
        assert_eq!(
            session.set_task_duration(2, 0),
            Err(SessionError::Task(TaskError::NonPositiveDuration))
        );
        assert_eq!(session.set_task_duration(9, 5), Err(SessionError::UnknownTask(9)));
    }

    #[test]
    fn empty_breakdown_is_already_complete() {
        let session = Session::new("nothing", 10, Vec::new());
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn restore_rejects_cursor_past_end() {
        let err = Session::restore(
            "abc".into(),
            "goal".into(),
            30,
            SessionStatus::InProgress,
            4,
            Local::now().naive_local(),
            three_tasks(),
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Inconsistent { .. }));
    }

    #[test]
    fn restore_normalizes_finished_cursor() {
        let session = Session::restore(
            "abc".into(),
            "goal".into(),
            30,
            SessionStatus::Paused,
            3,
            Local::now().naive_local(),
            three_tasks(),
        )
        .unwrap();
        assert_eq!(session.status(), SessionStatus::Completed);
    }

    #[test]
    fn restore_rejects_completed_with_remaining_tasks() {
        let result = Session::restore(
            "abc".into(),
            "goal".into(),
            30,
            SessionStatus::Completed,
            1,
            Local::now().naive_local(),
            three_tasks(),
        );
        assert!(result.is_err());
    }
}
