use std::fs;

use tempfile::TempDir;

use super::SessionStore;
use crate::model::{Session, Task};
use crate::types::{SessionStatus, TaskStatus};

fn store_in(dir: &TempDir) -> SessionStore {
    SessionStore::open(dir.path().join("data").join("sessions.json")).expect("open store")
}

fn essay_session() -> Session {
    Session::new(
        "Write essay",
        30,
        vec![
            Task::new(1, "Open document", 5),
            Task::new(2, "Write intro", 10),
            Task::new(3, "Write body", 15),
        ],
    )
}

fn finished_session(goal: &str) -> Session {
    let mut session = Session::new(goal, 10, vec![Task::new(1, "only step", 10)]);
    session.complete_current();
    session
}

#[test]
fn open_creates_directory_and_empty_object() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    assert!(store.path().exists());
    let raw = fs::read_to_string(store.path()).unwrap();
    assert_eq!(raw.trim(), "{}");
}

#[test]
fn open_keeps_existing_contents() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let session = essay_session();
    store.save(&session).unwrap();
    let reopened = store_in(&dir);
    assert!(reopened.get(session.id()).is_some());
}

#[test]
fn pause_round_trips_through_the_file() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let mut session = essay_session();
    session.complete_current();
    session.skip_current();
    session.pause();
    store.save(&session).unwrap();

    let loaded = store.get(session.id()).expect("session stored");
    assert_eq!(loaded.status(), SessionStatus::Paused);
    assert_eq!(loaded.cursor(), 2);
    let statuses: Vec<TaskStatus> = loaded.tasks().iter().map(Task::status).collect();
    assert_eq!(
        statuses,
        vec![TaskStatus::Completed, TaskStatus::Skipped, TaskStatus::Pending]
    );
    assert_eq!(loaded, session_truncated_to_seconds(&session));
}

fn session_truncated_to_seconds(session: &Session) -> Session {
    let created = session
        .created_at()
        .format(super::CREATED_AT_FORMAT)
        .to_string();
    Session::restore(
        session.id().to_string(),
        session.goal().to_string(),
        session.time_budget(),
        session.status(),
        session.cursor(),
        chrono::NaiveDateTime::parse_from_str(&created, super::CREATED_AT_FORMAT).unwrap(),
        session.tasks().to_vec(),
    )
    .unwrap()
}

#[test]
fn save_overwrites_existing_entry() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let mut session = essay_session();
    store.save(&session).unwrap();
    session.complete_current();
    store.save(&session).unwrap();

    let loaded = store.get(session.id()).unwrap();
    assert_eq!(loaded.cursor(), 1);
    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw.as_object().unwrap().len(), 1);
}

#[test]
fn first_unfinished_ignores_completed_sessions() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save(&finished_session("done one")).unwrap();
    store.save(&finished_session("done two")).unwrap();
    assert!(store.first_unfinished().is_none());

    let mut paused = essay_session();
    paused.pause();
    store.save(&paused).unwrap();
    let found = store.first_unfinished().expect("unfinished session");
    assert_eq!(found.id(), paused.id());
    assert_eq!(found.status(), SessionStatus::Paused);
}

#[test]
fn first_unfinished_follows_file_order() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let first = essay_session();
    let second = essay_session();
    store.save(&first).unwrap();
    store.save(&second).unwrap();
    store.save(&first).unwrap();
    assert_eq!(store.first_unfinished().unwrap().id(), first.id());
}

#[test]
fn completed_queries_only_return_finished_sessions() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save(&essay_session()).unwrap();
    store.save(&finished_session("clean room")).unwrap();
    store.save(&finished_session("study")).unwrap();

    let goals: Vec<String> = store
        .completed()
        .iter()
        .map(|s| s.goal().to_string())
        .collect();
    assert_eq!(goals, vec!["clean room", "study"]);
    assert_eq!(store.completed_count(), 2);
}

#[test]
fn delete_then_get_returns_none() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let session = essay_session();
    store.save(&session).unwrap();
    assert!(store.delete(session.id()).unwrap());
    assert!(store.get(session.id()).is_none());
    assert!(!store.delete(session.id()).unwrap());
}

const MISMATCHED_KEY_FILE: &str = r#"{
    "8ccacbf0-key": {"session_id": "20251127_233611", "goal": "Study", "status": "paused",
                     "current_task": 0, "created_at": "2025-11-27 23:36:11",
                     "tasks": [{"task_number": 1, "description": "Read notes",
                                "timer_minutes": 10, "status": "pending"}]}
}"#;

#[test]
fn entry_key_is_the_session_identity() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), MISMATCHED_KEY_FILE).unwrap();

    let session = store.first_unfinished().expect("paused session");
    assert_eq!(session.id(), "8ccacbf0-key");
    assert!(store.get(session.id()).is_some());
    assert!(store.delete(session.id()).unwrap());
    assert!(store.first_unfinished().is_none());
}

#[test]
fn saving_a_mismatched_entry_rewrites_it_in_place() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), MISMATCHED_KEY_FILE).unwrap();

    let mut session = store.first_unfinished().unwrap();
    session.resume();
    session.complete_current();
    store.save(&session).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    let entries = raw.as_object().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries["8ccacbf0-key"]["session_id"], "8ccacbf0-key");
    assert!(store.first_unfinished().is_none());
    assert_eq!(store.completed_count(), 1);
}

#[test]
fn corrupt_file_reads_as_empty_store() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::write(store.path(), "{ not json").unwrap();
    assert!(store.first_unfinished().is_none());
    assert!(store.completed().is_empty());
    assert_eq!(store.completed_count(), 0);

    let session = essay_session();
    store.save(&session).unwrap();
    assert!(store.get(session.id()).is_some());
}

#[test]
fn missing_file_reads_as_empty_store() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::remove_file(store.path()).unwrap();
    assert!(store.get("anything").is_none());
    assert!(store.completed().is_empty());
}

#[test]
fn malformed_entry_is_skipped_not_fatal() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::write(
        store.path(),
        r#"{
            "broken": {"session_id": "broken", "tasks": "not a list"},
            "past-end": {"session_id": "past-end", "status": "paused", "current_task": 7,
                         "tasks": [{"task_number": 1, "description": "a", "timer_minutes": 5}]},
            "ok": {"session_id": "ok", "goal": "Write essay", "status": "completed",
                   "current_task": 1, "created_at": "2025-11-27 23:36:11",
                   "tasks": [{"task_number": 1, "description": "Open document",
                              "timer_minutes": 5, "status": "completed"}]}
        }"#,
    )
    .unwrap();

    assert!(store.get("broken").is_none());
    assert!(store.get("past-end").is_none());
    assert!(store.first_unfinished().is_none());
    let completed = store.completed();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id(), "ok");
}

#[test]
fn older_records_get_field_defaults() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::write(
        store.path(),
        r#"{
            "8ccacbf0-0ec4-49c2-8751-d7feb71af71c": {
                "goal": "Write essay",
                "status": "in_progress",
                "current_task": 0,
                "created_at": "2025-11-27 23:36:11",
                "tasks": [
                    {"task_number": 1, "description": "Open document"},
                    {"task_number": 2, "description": "Write intro", "timer_minutes": 10}
                ]
            }
        }"#,
    )
    .unwrap();

    let session = store.first_unfinished().expect("legacy session loads");
    assert_eq!(session.id(), "8ccacbf0-0ec4-49c2-8751-d7feb71af71c");
    assert_eq!(session.time_budget(), 60);
    assert_eq!(session.tasks()[0].duration_minutes(), 5);
    assert_eq!(session.tasks()[0].status(), TaskStatus::Pending);
}

#[test]
fn written_record_uses_stable_field_names() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let session = essay_session();
    store.save(&session).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    let entry = &raw[session.id()];
    assert_eq!(entry["session_id"], session.id());
    assert_eq!(entry["goal"], "Write essay");
    assert_eq!(entry["time_available"], 30);
    assert_eq!(entry["status"], "in_progress");
    assert_eq!(entry["current_task"], 0);
    assert_eq!(entry["tasks"][1]["task_number"], 2);
    assert_eq!(entry["tasks"][1]["timer_minutes"], 10);
    assert_eq!(entry["tasks"][1]["status"], "pending");
}
