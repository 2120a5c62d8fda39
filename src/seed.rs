//! Seed data used when no persisted state exists.

use chrono::{DateTime, Utc};

use crate::model::{
    Category, ChecklistItem, CompletionState, Priority, Task, TaskTemplate, TemplateTask,
};
use crate::state::TrackerState;

/// Full seed state with every task due `now`.
pub fn seed_state(now: DateTime<Utc>) -> TrackerState {
    TrackerState {
        tasks: seed_tasks(now),
        checklist_items: seed_checklist(),
        templates: seed_templates(),
    }
}

fn seed_tasks(now: DateTime<Utc>) -> Vec<Task> {
    let task = |id: &str, title: &str, category, priority, completion| Task {
        id: id.to_string(),
        title: title.to_string(),
        category,
        priority,
        due_date: now,
        completion,
    };

    vec![
        task(
            "1",
            "Design new dashboard layout",
            Category::Work,
            Priority::High,
            CompletionState::Pending,
        ),
        task(
            "2",
            "Read chapter 3 of chemistry book",
            Category::School,
            Priority::Medium,
            CompletionState::Pending,
        ),
        task(
            "3",
            "Go for a 30-minute run",
            Category::Health,
            Priority::Low,
            CompletionState::Completed { at: now },
        ),
        task(
            "4",
            "Schedule dentist appointment",
            Category::Personal,
            Priority::Medium,
            CompletionState::Pending,
        ),
    ]
}

fn seed_checklist() -> Vec<ChecklistItem> {
    vec![
        ChecklistItem {
            id: "c1".to_string(),
            text: "Drink water".to_string(),
            completed: true,
        },
        ChecklistItem {
            id: "c2".to_string(),
            text: "Quick stand-up meeting".to_string(),
            completed: false,
        },
    ]
}

/// Templates shipped with a fresh install. Also used to backfill state
/// persisted before templates existed.
pub fn seed_templates() -> Vec<TaskTemplate> {
    let prototype = |id: &str, title: &str, category, priority| TemplateTask {
        id: id.to_string(),
        title: title.to_string(),
        category,
        priority,
    };

    vec![
        TaskTemplate {
            id: "tpl-morning".to_string(),
            name: "Morning Routine".to_string(),
            tasks: vec![
                prototype("tpl-morning-1", "Stretch for 10 minutes", Category::Health, Priority::Medium),
                prototype("tpl-morning-2", "Review today's calendar", Category::Work, Priority::High),
                prototype("tpl-morning-3", "Tidy the desk", Category::Personal, Priority::Low),
            ],
        },
        TaskTemplate {
            id: "tpl-weekly".to_string(),
            name: "Weekly Review".to_string(),
            tasks: vec![
                prototype("tpl-weekly-1", "Clear the inbox", Category::Work, Priority::Medium),
                prototype("tpl-weekly-2", "Plan next week's goals", Category::Personal, Priority::High),
            ],
        },
    ]
}
