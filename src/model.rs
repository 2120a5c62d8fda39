//! Entity model for trackwise.
//!
//! Tasks, checklist items, and templates. Categories and priorities are
//! closed enums; completion is a single tagged state so a task can never
//! carry a completion timestamp while pending.
//!
//! Constructors validate user input. Entities that reach the store are
//! assumed valid; the reducer does not re-check them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Minimum length (in characters) of a task or template-task title.
pub const MIN_TITLE_LEN: usize = 3;

/// Minimum length (in characters) of a template name.
pub const MIN_TEMPLATE_NAME_LEN: usize = 3;

/// Generate a fresh opaque identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Work,
    School,
    Personal,
    Health,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Work,
        Category::School,
        Category::Personal,
        Category::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::School => "School",
            Category::Personal => "Personal",
            Category::Health => "Health",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown category '{trimmed}' (expected work|school|personal|health)"
                ))
            })
    }
}

/// Task priority. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown priority '{trimmed}' (expected low|medium|high)"
                ))
            })
    }
}

/// Whether a task is done, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionState {
    #[default]
    Pending,
    Completed {
        at: DateTime<Utc>,
    },
}

impl CompletionState {
    pub fn is_completed(&self) -> bool {
        matches!(self, CompletionState::Completed { .. })
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            CompletionState::Pending => None,
            CompletionState::Completed { at } => Some(*at),
        }
    }

    /// Flip the state. Completing stamps `now`; reopening drops the stamp.
    pub fn toggled(&self, now: DateTime<Utc>) -> Self {
        match self {
            CompletionState::Pending => CompletionState::Completed { at: now },
            CompletionState::Completed { .. } => CompletionState::Pending,
        }
    }
}

/// A user-scheduled unit of work.
///
/// Serialized in the flat persisted shape (`completed` + optional
/// `completionDate`); see [`crate::storage::TaskRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "crate::storage::TaskRecord", into = "crate::storage::TaskRecord")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    pub due_date: DateTime<Utc>,
    pub completion: CompletionState,
}

impl Task {
    /// Create a pending task with a fresh id after validating the title.
    pub fn new(
        title: &str,
        category: Category,
        priority: Priority,
        due_date: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            id: new_id(),
            title: validate_title(title)?,
            category,
            priority,
            due_date,
            completion: CompletionState::Pending,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.completion.is_completed()
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completion.completed_at()
    }
}

/// A one-line entry in the quick checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

impl ChecklistItem {
    pub fn new(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::validation("text", "checklist text cannot be empty"));
        }
        Ok(Self {
            id: new_id(),
            text: text.to_string(),
            completed: false,
        })
    }
}

/// A task prototype: no schedule, no completion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTask {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub priority: Priority,
}

impl TemplateTask {
    pub fn new(title: &str, category: Category, priority: Priority) -> Result<Self> {
        Ok(Self {
            id: new_id(),
            title: validate_title(title)?,
            category,
            priority,
        })
    }

    /// Parse a `title:category:priority` argument as accepted on the command line.
    pub fn parse_arg(arg: &str) -> Result<Self> {
        let mut parts = arg.rsplitn(3, ':');
        let priority = parts.next();
        let category = parts.next();
        let title = parts.next();
        match (title, category, priority) {
            (Some(title), Some(category), Some(priority)) => {
                Self::new(title, category.parse()?, priority.parse()?)
            }
            _ => Err(Error::InvalidArgument(format!(
                "invalid template task '{arg}' (expected title:category:priority)"
            ))),
        }
    }
}

/// A named, reusable bundle of task prototypes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub id: String,
    pub name: String,
    pub tasks: Vec<TemplateTask>,
}

impl TaskTemplate {
    pub fn new(name: &str, tasks: Vec<TemplateTask>) -> Result<Self> {
        let name = name.trim();
        if name.chars().count() < MIN_TEMPLATE_NAME_LEN {
            return Err(Error::validation(
                "name",
                format!("template name must be at least {MIN_TEMPLATE_NAME_LEN} characters"),
            ));
        }
        if tasks.is_empty() {
            return Err(Error::validation(
                "tasks",
                "a template must have at least one task",
            ));
        }
        Ok(Self {
            id: new_id(),
            name: name.to_string(),
            tasks,
        })
    }
}

/// Trim a title and enforce the minimum length.
pub fn validate_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.chars().count() < MIN_TITLE_LEN {
        return Err(Error::validation(
            "title",
            format!("title must be at least {MIN_TITLE_LEN} characters"),
        ));
    }
    Ok(title.to_string())
}
