//! trackwise task command implementations.

use chrono::{Local, Utc};
use serde::Serialize;

use crate::analytics::{dashboard_at, TaskFilter};
use crate::cli::{
    format_local_date, output_options, parse_category, parse_due_date, parse_priority, resolve_id,
    short_id, CommonOptions, Context,
};
use crate::error::{Error, Result};
use crate::model::{validate_title, Task};
use crate::output::{emit_success, HumanOutput};
use crate::state::Action;

pub struct AddOptions {
    pub title: String,
    pub category: String,
    pub priority: String,
    pub due: Option<String>,
    pub common: CommonOptions,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub common: CommonOptions,
}

pub struct IdOptions {
    pub id: String,
    pub common: CommonOptions,
}

pub struct ListOptions {
    pub today: bool,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub common: CommonOptions,
}

pub struct ReorderOptions {
    pub ids: Vec<String>,
    pub common: CommonOptions,
}

#[derive(Serialize)]
struct TaskListOutput<'a> {
    tasks: &'a [Task],
    pending: usize,
    completed: usize,
}

#[derive(Serialize)]
struct TaskRemovedOutput {
    id: String,
}

/// One-line rendering used by list output.
pub(crate) fn task_line(task: &Task) -> String {
    let mark = if task.is_completed() { "x" } else { " " };
    format!(
        "[{mark}] {} ({}, {}, due {}) {}",
        task.title,
        task.category,
        task.priority,
        format_local_date(task.due_date),
        short_id(&task.id)
    )
}

fn resolve_task_id(ctx: &Context, raw: &str) -> Result<String> {
    resolve_id(
        ctx.store.state().tasks.iter().map(|task| task.id.as_str()),
        raw,
        Error::TaskNotFound,
    )
}

fn task_summary(human: &mut HumanOutput, task: &Task) {
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Category", task.category.to_string());
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary("Due", format_local_date(task.due_date));
    if let Some(at) = task.completed_at() {
        human.push_summary("Completed", at.with_timezone(&Local).to_rfc3339());
    }
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let category = options.category.parse()?;
    let priority = options.priority.parse()?;
    let due_date = match options.due.as_deref() {
        Some(raw) => parse_due_date(raw)?,
        None => Utc::now(),
    };
    let task = Task::new(&options.title, category, priority, due_date)?;

    let mut ctx = Context::load(&options.common)?;
    ctx.store.dispatch(Action::AddTask(task.clone()));

    let mut human = HumanOutput::new("Task added");
    task_summary(&mut human, &task);
    emit_success(output_options(&options.common), "task add", &task, Some(&human))
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let mut ctx = Context::load(&options.common)?;
    let id = resolve_task_id(&ctx, &options.id)?;
    let mut task = ctx
        .store
        .state()
        .task(&id)
        .cloned()
        .ok_or_else(|| Error::TaskNotFound(id.clone()))?;

    if let Some(title) = options.title.as_deref() {
        task.title = validate_title(title)?;
    }
    if let Some(category) = parse_category(options.category.as_deref())? {
        task.category = category;
    }
    if let Some(priority) = parse_priority(options.priority.as_deref())? {
        task.priority = priority;
    }
    if let Some(raw) = options.due.as_deref() {
        task.due_date = parse_due_date(raw)?;
    }

    ctx.store.dispatch(Action::UpdateTask(task.clone()));

    let mut human = HumanOutput::new("Task updated");
    task_summary(&mut human, &task);
    emit_success(output_options(&options.common), "task edit", &task, Some(&human))
}

pub fn run_rm(options: IdOptions) -> Result<()> {
    let mut ctx = Context::load(&options.common)?;
    let id = resolve_task_id(&ctx, &options.id)?;
    ctx.store.dispatch(Action::DeleteTask(id.clone()));

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", id.clone());
    emit_success(
        output_options(&options.common),
        "task rm",
        &TaskRemovedOutput { id },
        Some(&human),
    )
}

pub fn run_toggle(options: IdOptions) -> Result<()> {
    let mut ctx = Context::load(&options.common)?;
    let id = resolve_task_id(&ctx, &options.id)?;
    let state = ctx.store.dispatch(Action::ToggleTaskCompletion(id.clone()));
    let task = state
        .task(&id)
        .cloned()
        .ok_or_else(|| Error::TaskNotFound(id.clone()))?;

    let header = if task.is_completed() {
        "Task completed"
    } else {
        "Task reopened"
    };
    let mut human = HumanOutput::new(header);
    task_summary(&mut human, &task);
    emit_success(output_options(&options.common), "task toggle", &task, Some(&human))
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let filter = TaskFilter {
        category: parse_category(options.category.as_deref())?,
        priority: parse_priority(options.priority.as_deref())?,
    };
    let ctx = Context::load(&options.common)?;
    let view = dashboard_at(&ctx.store.state().tasks, &Local::now(), options.today, filter);

    let header = if options.today {
        "Tasks due today"
    } else {
        "Tasks"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("Pending", view.pending.to_string());
    human.push_summary("Completed", view.completed.to_string());
    if view.tasks.is_empty() {
        human.push_detail("No tasks. Add one with `trackwise task add`.");
    }
    for task in &view.tasks {
        human.push_detail(task_line(task));
    }

    emit_success(
        output_options(&options.common),
        "task list",
        &TaskListOutput {
            tasks: &view.tasks,
            pending: view.pending,
            completed: view.completed,
        },
        Some(&human),
    )
}

pub fn run_reorder(options: ReorderOptions) -> Result<()> {
    let mut ctx = Context::load(&options.common)?;
    let ids = options
        .ids
        .iter()
        .map(|raw| resolve_task_id(&ctx, raw))
        .collect::<Result<Vec<_>>>()?;

    let state = ctx.store.dispatch(Action::ReorderTasks(ids));

    let mut human = HumanOutput::new("Tasks reordered");
    for task in &state.tasks {
        human.push_detail(task_line(task));
    }
    emit_success(
        output_options(&options.common),
        "task reorder",
        &TaskListOutput {
            tasks: &state.tasks,
            pending: state.tasks.iter().filter(|task| !task.is_completed()).count(),
            completed: state.tasks.iter().filter(|task| task.is_completed()).count(),
        },
        Some(&human),
    )
}
