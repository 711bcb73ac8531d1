use crate::error::TaskError;
use crate::types::TaskStatus;

/// One timed step of a breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    ordinal: u32,
    description: String,
    duration_minutes: u32,
    status: TaskStatus,
}

impl Task {
    pub fn new(ordinal: u32, description: impl Into<String>, duration_minutes: u32) -> Self {
        Self::restore(ordinal, description, duration_minutes, TaskStatus::Pending)
    }

    pub(crate) fn restore(
        ordinal: u32,
        description: impl Into<String>,
        duration_minutes: u32,
        status: TaskStatus,
    ) -> Self {
        Self {
            ordinal,
            description: description.into(),
            duration_minutes,
            status,
        }
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    pub fn complete(&mut self) {
        self.status = TaskStatus::Completed;
    }

    pub fn skip(&mut self) {
        self.status = TaskStatus::Skipped;
    }

    pub fn set_duration(&mut self, minutes: u32) -> Result<(), TaskError> {
        if minutes == 0 {
            return Err(TaskError::NonPositiveDuration);
        }
        self.duration_minutes = minutes;
        Ok(())
    }

    pub(crate) fn extend(&mut self, minutes: u32) {
        self.duration_minutes = self.duration_minutes.saturating_add(minutes);
    }

    pub(crate) fn renumber(&mut self, ordinal: u32) {
        self.ordinal = ordinal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_is_idempotent() {
        let mut task = Task::new(1, "Study math", 30);
        task.complete();
        task.complete();
        assert_eq!(task.status(), TaskStatus::Completed);
    }

    #[test]
    fn skip_marks_skipped() {
        let mut task = Task::new(2, "Write essay", 45);
        task.skip();
        assert_eq!(task.status(), TaskStatus::Skipped);
        assert!(!task.is_pending());
    }

    #[test]
    fn set_duration_rejects_zero() {
        let mut task = Task::new(1, "Open textbook", 5);
        assert_eq!(task.set_duration(0), Err(TaskError::NonPositiveDuration));
        assert_eq!(task.duration_minutes(), 5);
        task.set_duration(12).unwrap();
        assert_eq!(task.duration_minutes(), 12);
    }

    #[test]
    fn extend_saturates() {
        let mut task = Task::new(1, "Read", u32::MAX - 1);
        task.extend(10);
        assert_eq!(task.duration_minutes(), u32::MAX);
    }
}
