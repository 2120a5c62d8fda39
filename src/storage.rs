//! Persistence adapter for trackwise state.
//!
//! The whole state is stored as one JSON document:
//!
//! ```text
//! {
//!   "tasks": [{ "id", "title", "category", "priority",
//!               "dueDate", "completed", "completionDate"? }],
//!   "checklistItems": [{ "id", "text", "completed" }],
//!   "templates": [{ "id", "name", "tasks": [...] }]     # may be absent
//! }
//! ```
//!
//! Timestamps are RFC 3339 strings and are parsed back into `DateTime<Utc>`
//! on load. Documents written before templates existed lack the
//! `templates` key; those are backfilled with the seed templates.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::model::{Category, ChecklistItem, CompletionState, Priority, Task, TaskTemplate};
use crate::seed;
use crate::state::TrackerState;

/// File name of the state document inside the data directory.
pub const STATE_FILE: &str = "trackwise_state.json";

/// Flat on-disk shape of a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    pub due_date: DateTime<Utc>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<DateTime<Utc>>,
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        Self {
            completed: task.is_completed(),
            completion_date: task.completed_at(),
            id: task.id,
            title: task.title,
            category: task.category,
            priority: task.priority,
            due_date: task.due_date,
        }
    }
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let completion = match (record.completed, record.completion_date) {
            (true, Some(at)) => CompletionState::Completed { at },
            (true, None) => {
                tracing::warn!(task = %record.id, "completed task has no completion date; loading as pending");
                CompletionState::Pending
            }
            (false, Some(_)) => {
                tracing::debug!(task = %record.id, "dropping completion date of pending task");
                CompletionState::Pending
            }
            (false, None) => CompletionState::Pending,
        };

        Self {
            id: record.id,
            title: record.title,
            category: record.category,
            priority: record.priority,
            due_date: record.due_date,
            completion,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    checklist_items: Vec<ChecklistItem>,
    #[serde(default)]
    templates: Option<Vec<TaskTemplate>>,
}

/// Serialize the full state to its persisted JSON form.
pub fn encode_state(state: &TrackerState) -> Result<String> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Parse a persisted document, applying the template backfill.
pub fn decode_state(raw: &str) -> Result<TrackerState> {
    let persisted: PersistedState = serde_json::from_str(raw)?;
    let templates = match persisted.templates {
        Some(templates) => templates,
        None => {
            tracing::info!("persisted state predates templates; backfilling seed templates");
            seed::seed_templates()
        }
    };

    Ok(TrackerState {
        tasks: persisted.tasks,
        checklist_items: persisted.checklist_items,
        templates,
    })
}

/// What happened to a state file that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// The undecodable document now lives at this path.
    MovedAside(PathBuf),
    /// The document could not be read or moved and must not be overwritten.
    Untouched { reason: String },
}

/// State produced at startup, with any recovery that was needed.
#[derive(Debug, Clone)]
pub struct Restored {
    pub state: TrackerState,
    pub recovery: Option<Recovery>,
}

impl Restored {
    fn new(state: TrackerState) -> Self {
        Self {
            state,
            recovery: None,
        }
    }

    /// Whether saving over the state file is safe.
    pub fn is_writable(&self) -> bool {
        !matches!(self.recovery, Some(Recovery::Untouched { .. }))
    }
}

fn is_undecodable(err: &Error) -> bool {
    match err {
        Error::Json(_) => true,
        Error::Io(err) => err.kind() == io::ErrorKind::InvalidData,
        _ => false,
    }
}

/// Durable home of the tracker state.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
    lock_timeout_ms: u64,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Path to the state document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted state. `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<TrackerState>> {
        let raw = match lock::read_locked_str(&self.path, self.lock_timeout_ms) {
            Ok(raw) => raw,
            Err(Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        decode_state(&raw).map(Some)
    }

    /// Load the persisted state, falling back to the seed data. Never fails.
    ///
    /// A document that cannot be decoded is moved aside before the seed
    /// data is used, so a later save cannot replace it. A document that
    /// cannot be read or moved is left untouched and the result is marked
    /// read-only.
    pub fn restore(&self, now: DateTime<Utc>) -> Restored {
        let err = match self.load() {
            Ok(Some(state)) => {
                tracing::debug!(path = %self.path.display(), tasks = state.tasks.len(), "restored state");
                return Restored::new(state);
            }
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "no persisted state; using seed data");
                return Restored::new(seed::seed_state(now));
            }
            Err(err) => err,
        };

        let recovery = if is_undecodable(&err) {
            match self.quarantine(now) {
                Ok(moved) => {
                    tracing::warn!(path = %self.path.display(), moved = %moved.display(), error = %err, "state file unreadable; moved aside");
                    Recovery::MovedAside(moved)
                }
                Err(move_err) => {
                    tracing::warn!(path = %self.path.display(), error = %move_err, "could not move unreadable state file");
                    Recovery::Untouched {
                        reason: format!("{err}; moving it aside failed: {move_err}"),
                    }
                }
            }
        } else {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to load state");
            Recovery::Untouched {
                reason: err.to_string(),
            }
        };

        Restored {
            state: seed::seed_state(now),
            recovery: Some(recovery),
        }
    }

    /// Move the current document to `<path>.corrupt-<timestamp>`.
    pub fn quarantine(&self, now: DateTime<Utc>) -> Result<PathBuf> {
        let target = PathBuf::from(format!(
            "{}.corrupt-{}",
            self.path.display(),
            now.format("%Y%m%dT%H%M%SZ")
        ));
        let _lock = FileLock::acquire(lock::lock_path_for(&self.path), self.lock_timeout_ms)?;
        std::fs::rename(&self.path, &target)?;
        Ok(target)
    }

    /// Overwrite the persisted document with `state`.
    pub fn save(&self, state: &TrackerState) -> Result<()> {
        let encoded = encode_state(state)?;
        lock::write_atomic_locked(&self.path, encoded.as_bytes(), self.lock_timeout_ms)
    }
}
