use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("task duration must be at least 1 minute")]
    NonPositiveDuration,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FitError {
    #[error("{budget} minute(s) cannot hold {tasks} tasks of at least 1 minute each")]
    BudgetTooSmall { budget: u32, tasks: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no task numbered {0} in this session")]
    UnknownTask(u32),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("stored session `{id}` is inconsistent: {reason}")]
    Inconsistent { id: String, reason: String },
}

/// Failure of the bounded breakdown loop.
#[derive(Debug, Error)]
pub enum BreakdownError {
    #[error("retry budget is zero, no breakdown attempted")]
    NoAttempts,
    #[error("failed to break down goal after {attempts} attempt(s){}", last_error_suffix(.last_error))]
    Exhausted {
        attempts: u32,
        last_error: Option<String>,
    },
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(e) => format!(": {e}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_message_includes_last_error() {
        let err = BreakdownError::Exhausted {
            attempts: 3,
            last_error: Some("API error 503".into()),
        };
        assert_eq!(
            err.to_string(),
            "failed to break down goal after 3 attempt(s): API error 503"
        );
    }

    #[test]
    fn exhausted_message_without_last_error() {
        let err = BreakdownError::Exhausted {
            attempts: 2,
            last_error: None,
        };
        assert_eq!(err.to_string(), "failed to break down goal after 2 attempt(s)");
    }
}
