//! trackwise template commands.

use serde::Serialize;

use crate::cli::{output_options, resolve_id, short_id, CommonOptions, Context};
use crate::error::{Error, Result};
use crate::model::{Task, TaskTemplate, TemplateTask};
use crate::output::{emit_success, HumanOutput};
use crate::state::Action;

#[derive(Serialize)]
struct TemplateApplyOutput<'a> {
    template: &'a TaskTemplate,
    created: &'a [Task],
}

#[derive(Serialize)]
struct TemplateRemovedOutput {
    id: String,
}

fn resolve_template_id(ctx: &Context, raw: &str) -> Result<String> {
    resolve_id(
        ctx.store
            .state()
            .templates
            .iter()
            .map(|template| template.id.as_str()),
        raw,
        Error::TemplateNotFound,
    )
}

fn prototype_line(task: &TemplateTask) -> String {
    format!("{} ({}, {})", task.title, task.category, task.priority)
}

pub fn run_add(name: String, task_args: Vec<String>, common: CommonOptions) -> Result<()> {
    let prototypes = task_args
        .iter()
        .map(|arg| TemplateTask::parse_arg(arg))
        .collect::<Result<Vec<_>>>()?;
    let template = TaskTemplate::new(&name, prototypes)?;

    let mut ctx = Context::load(&common)?;
    ctx.store.dispatch(Action::AddTemplate(template.clone()));

    let mut human = HumanOutput::new("Template created");
    human.push_summary("ID", template.id.clone());
    human.push_summary("Name", template.name.clone());
    for task in &template.tasks {
        human.push_detail(prototype_line(task));
    }
    emit_success(output_options(&common), "template add", &template, Some(&human))
}

pub fn run_rm(id: String, common: CommonOptions) -> Result<()> {
    let mut ctx = Context::load(&common)?;
    let id = resolve_template_id(&ctx, &id)?;
    ctx.store.dispatch(Action::DeleteTemplate(id.clone()));

    let mut human = HumanOutput::new("Template deleted");
    human.push_summary("ID", id.clone());
    emit_success(
        output_options(&common),
        "template rm",
        &TemplateRemovedOutput { id },
        Some(&human),
    )
}

pub fn run_apply(id: String, common: CommonOptions) -> Result<()> {
    let mut ctx = Context::load(&common)?;
    let id = resolve_template_id(&ctx, &id)?;
    let template = ctx
        .store
        .state()
        .template(&id)
        .cloned()
        .ok_or_else(|| Error::TemplateNotFound(id.clone()))?;

    let before = ctx.store.state().tasks.len();
    let state = ctx.store.dispatch(Action::ApplyTemplate(id));
    let created = &state.tasks[before..];

    let mut human = HumanOutput::new(format!("Template \"{}\" applied", template.name));
    human.push_summary("Tasks added", created.len().to_string());
    for task in created {
        human.push_detail(format!("{} {}", task.title, short_id(&task.id)));
    }
    emit_success(
        output_options(&common),
        "template apply",
        &TemplateApplyOutput {
            template: &template,
            created,
        },
        Some(&human),
    )
}

pub fn run_list(common: CommonOptions) -> Result<()> {
    let ctx = Context::load(&common)?;
    let templates = &ctx.store.state().templates;

    let mut human = HumanOutput::new("Templates");
    if templates.is_empty() {
        human.push_detail("No templates yet. Create one with `trackwise template add`.");
    }
    for template in templates {
        let tasks: Vec<String> = template.tasks.iter().map(prototype_line).collect();
        human.push_detail(format!(
            "{} {}: {}",
            template.name,
            short_id(&template.id),
            tasks.join("; ")
        ));
    }
    emit_success(output_options(&common), "template list", templates, Some(&human))
}
