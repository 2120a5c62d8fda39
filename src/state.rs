//! Tracker state and its transition function.
//!
//! `apply(state, action)` is total: every action either produces a new
//! state or returns the input unchanged. Lookup misses are no-ops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{new_id, ChecklistItem, CompletionState, Task, TaskTemplate};
use crate::reorder::merge_order;

/// Maximum number of quick-checklist entries.
pub const CHECKLIST_CAPACITY: usize = 5;

/// Authoritative in-memory collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    pub tasks: Vec<Task>,
    pub checklist_items: Vec<ChecklistItem>,
    pub templates: Vec<TaskTemplate>,
}

impl TrackerState {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn checklist_item(&self, id: &str) -> Option<&ChecklistItem> {
        self.checklist_items.iter().find(|item| item.id == id)
    }

    pub fn template(&self, id: &str) -> Option<&TaskTemplate> {
        self.templates.iter().find(|template| template.id == id)
    }

    pub fn checklist_is_full(&self) -> bool {
        self.checklist_items.len() >= CHECKLIST_CAPACITY
    }
}

/// Every mutation the store accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetInitialState(TrackerState),
    AddTask(Task),
    UpdateTask(Task),
    DeleteTask(String),
    ToggleTaskCompletion(String),
    ReorderTasks(Vec<String>),
    AddChecklistItem(ChecklistItem),
    ToggleChecklistItem(String),
    DeleteChecklistItem(String),
    AddTemplate(TaskTemplate),
    DeleteTemplate(String),
    ApplyTemplate(String),
}

impl Action {
    /// Stable name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetInitialState(_) => "set_initial_state",
            Action::AddTask(_) => "add_task",
            Action::UpdateTask(_) => "update_task",
            Action::DeleteTask(_) => "delete_task",
            Action::ToggleTaskCompletion(_) => "toggle_task_completion",
            Action::ReorderTasks(_) => "reorder_tasks",
            Action::AddChecklistItem(_) => "add_checklist_item",
            Action::ToggleChecklistItem(_) => "toggle_checklist_item",
            Action::DeleteChecklistItem(_) => "delete_checklist_item",
            Action::AddTemplate(_) => "add_template",
            Action::DeleteTemplate(_) => "delete_template",
            Action::ApplyTemplate(_) => "apply_template",
        }
    }
}

/// Apply `action` to `state` using the current time.
pub fn apply(state: TrackerState, action: Action) -> TrackerState {
    apply_at(state, action, Utc::now())
}

/// Apply `action` to `state`, treating `now` as the current moment.
///
/// `now` stamps completions and the due date of template-expanded tasks.
pub fn apply_at(mut state: TrackerState, action: Action, now: DateTime<Utc>) -> TrackerState {
    match action {
        Action::SetInitialState(next) => next,
        Action::AddTask(task) => {
            state.tasks.push(task);
            state
        }
        Action::UpdateTask(updated) => {
            if let Some(slot) = state.tasks.iter_mut().find(|task| task.id == updated.id) {
                *slot = updated;
            }
            state
        }
        Action::DeleteTask(id) => {
            state.tasks.retain(|task| task.id != id);
            state
        }
        Action::ToggleTaskCompletion(id) => {
            if let Some(task) = state.tasks.iter_mut().find(|task| task.id == id) {
                task.completion = task.completion.toggled(now);
            }
            state
        }
        Action::ReorderTasks(ordering) => {
            state.tasks = merge_order(&state.tasks, &ordering);
            state
        }
        Action::AddChecklistItem(item) => {
            if !state.checklist_is_full() {
                state.checklist_items.push(item);
            }
            state
        }
        Action::ToggleChecklistItem(id) => {
            if let Some(item) = state.checklist_items.iter_mut().find(|item| item.id == id) {
                item.completed = !item.completed;
            }
            state
        }
        Action::DeleteChecklistItem(id) => {
            state.checklist_items.retain(|item| item.id != id);
            state
        }
        Action::AddTemplate(template) => {
            state.templates.push(template);
            state
        }
        Action::DeleteTemplate(id) => {
            state.templates.retain(|template| template.id != id);
            state
        }
        Action::ApplyTemplate(id) => {
            let expanded = match state.template(&id) {
                Some(template) => expand_template(template, now),
                None => return state,
            };
            state.tasks.extend(expanded);
            state
        }
    }
}

/// Synthesize one pending task per prototype, all due `now`.
pub fn expand_template(template: &TaskTemplate, now: DateTime<Utc>) -> Vec<Task> {
    template
        .tasks
        .iter()
        .map(|prototype| Task {
            id: new_id(),
            title: prototype.title.clone(),
            category: prototype.category,
            priority: prototype.priority,
            due_date: now,
            completion: CompletionState::Pending,
        })
        .collect()
}
