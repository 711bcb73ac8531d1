use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Skipped,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    InProgress,
    Paused,
    Completed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

    pub fn is_unfinished(self) -> bool {
        matches!(self, Self::InProgress | Self::Paused)
    }
}

/// How the user wants a plan reshaped when regenerating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adjustment {
    /// "Too hard": smaller, effortless steps.
    Simpler,
    /// "Not enough": cover the goal end to end.
    MoreComprehensive,
    /// Concentrate the plan on one area.
    Focus(String),
}

impl Adjustment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simpler => "too_hard",
            Self::MoreComprehensive => "not_enough",
            Self::Focus(_) => "different_focus",
        }
    }
}

/// How a countdown ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    Elapsed,
    StoppedEarly,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_status_serializes_snake_case() {
        let json = serde_json::to_string(&SessionStatus::InProgress).unwrap();
        assert_eq!(json, r#""in_progress""#);
        let back: SessionStatus = serde_json::from_str(r#""paused""#).unwrap();
        assert_eq!(back, SessionStatus::Paused);
    }

    #[test]
    fn unfinished_covers_paused_and_in_progress() {
        assert!(SessionStatus::InProgress.is_unfinished());
        assert!(SessionStatus::Paused.is_unfinished());
        assert!(!SessionStatus::Completed.is_unfinished());
    }

    #[test]
    fn task_status_defaults_to_pending() {
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(TaskStatus::Skipped.as_str(), "skipped");
    }
}
