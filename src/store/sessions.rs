use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::model::{Session, Task};
use crate::types::{SessionStatus, TaskStatus};

pub(crate) const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Applied to records written before the time budget was stored.
const DEFAULT_TIME_BUDGET: u32 = 60;
const DEFAULT_TASK_MINUTES: u32 = 5;
const DEFAULT_GOAL: &str = "Unknown";

// ── On-disk record types ──────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default = "default_goal")]
    goal: String,
    #[serde(default = "default_time_budget")]
    time_available: u32,
    #[serde(default)]
    status: SessionStatus,
    #[serde(default)]
    current_task: usize,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    tasks: Vec<TaskRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TaskRecord {
    #[serde(default)]
    task_number: u32,
    #[serde(default)]
    description: String,
    #[serde(default = "default_task_minutes")]
    timer_minutes: u32,
    #[serde(default)]
    status: TaskStatus,
}

fn default_goal() -> String {
    DEFAULT_GOAL.to_string()
}

fn default_time_budget() -> u32 {
    DEFAULT_TIME_BUDGET
}

fn default_task_minutes() -> u32 {
    DEFAULT_TASK_MINUTES
}

impl From<&Session> for SessionRecord {
    fn from(session: &Session) -> Self {
        Self {
            session_id: Some(session.id().to_string()),
            goal: session.goal().to_string(),
            time_available: session.time_budget(),
            status: session.status(),
            current_task: session.cursor(),
            created_at: Some(session.created_at().format(CREATED_AT_FORMAT).to_string()),
            tasks: session
                .tasks()
                .iter()
                .map(|t| TaskRecord {
                    task_number: t.ordinal(),
                    description: t.description().to_string(),
                    timer_minutes: t.duration_minutes(),
                    status: t.status(),
                })
                .collect(),
        }
    }
}

impl SessionRecord {
    /// The map key is the session's identity. A stale `session_id` field is
    /// rewritten to match on the next save.
    fn into_session(self, key: &str) -> Result<Session> {
        if let Some(recorded) = self.session_id.as_deref() {
            if recorded != key {
                debug!(key, recorded, "session_id differs from its key, using the key");
            }
        }
        let id = key.to_string();
        let created_at = match self.created_at.as_deref() {
            Some(raw) => NaiveDateTime::parse_from_str(raw, CREATED_AT_FORMAT)
                .with_context(|| format!("bad created_at `{raw}`"))?,
            None => Local::now().naive_local(),
        };
        let tasks = self
            .tasks
            .into_iter()
            .map(|t| Task::restore(t.task_number, t.description, t.timer_minutes, t.status))
            .collect();
        Session::restore(
            id,
            self.goal,
            self.time_available,
            self.status,
            self.current_task,
            created_at,
            tasks,
        )
        .map_err(Into::into)
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// All sessions in one JSON object keyed by session id.
///
/// Every call reads the whole file and every write replaces it. A missing or
/// unreadable file reads as an empty store and malformed entries are skipped.
pub(crate) struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { path: path.into() };
        if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        if !store.path.exists() {
            store.write_map(&Map::new())?;
        }
        Ok(store)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or replace `session` under its id.
    pub(crate) fn save(&self, session: &Session) -> Result<()> {
        let mut map = self.load_map();
        let value = serde_json::to_value(SessionRecord::from(session))?;
        map.insert(session.id().to_string(), value);
        self.write_map(&map)?;
        debug!(session = session.id(), status = session.status().as_str(), cursor = session.cursor(), "session saved");
        Ok(())
    }

    pub(crate) fn get(&self, id: &str) -> Option<Session> {
        let map = self.load_map();
        let value = map.get(id)?.clone();
        decode_entry(id, value)
    }

    /// First paused or in-progress session in file order.
    pub(crate) fn first_unfinished(&self) -> Option<Session> {
        self.sessions()
            .into_iter()
            .find(|s| s.status().is_unfinished())
    }

    pub(crate) fn completed(&self) -> Vec<Session> {
        self.sessions()
            .into_iter()
            .filter(Session::is_finished)
            .collect()
    }

    pub(crate) fn completed_count(&self) -> usize {
        self.completed().len()
    }

    /// Remove a session. Returns whether it existed.
    pub(crate) fn delete(&self, id: &str) -> Result<bool> {
        let mut map = self.load_map();
        let existed = map.shift_remove(id).is_some();
        self.write_map(&map)?;
        if existed {
            debug!(session = id, "session deleted");
        }
        Ok(existed)
    }

    fn sessions(&self) -> Vec<Session> {
        self.load_map()
            .into_iter()
            .filter_map(|(key, value)| decode_entry(&key, value))
            .collect()
    }

    fn load_map(&self) -> Map<String, Value> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if self.path.exists() {
                    warn!(path = %self.path.display(), error = %e, "session store unreadable, treating as empty");
                }
                return Map::new();
            }
        };
        if raw.trim().is_empty() {
            return Map::new();
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!(path = %self.path.display(), "session store is not a JSON object, treating as empty");
                Map::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "session store is corrupt, treating as empty");
                Map::new()
            }
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        serde_json::to_writer_pretty(&mut tmp, map)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path)
            .map_err(|e| anyhow!("failed to write `{}`: {}", self.path.display(), e.error))?;
        Ok(())
    }
}

fn decode_entry(key: &str, value: Value) -> Option<Session> {
    let decoded = serde_json::from_value::<SessionRecord>(value)
        .map_err(anyhow::Error::from)
        .and_then(|record| record.into_session(key));
    match decoded {
        Ok(session) => Some(session),
        Err(e) => {
            warn!(session = key, error = %format!("{e:#}"), "skipping malformed session entry");
            None
        }
    }
}

#[cfg(test)]
mod tests;
