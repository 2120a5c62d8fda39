//! trackwise quick-checklist commands.

use serde::Serialize;

use crate::cli::{output_options, resolve_id, short_id, CommonOptions, Context};
use crate::error::{Error, Result};
use crate::model::ChecklistItem;
use crate::output::{emit_success, HumanOutput};
use crate::state::{Action, CHECKLIST_CAPACITY};

#[derive(Serialize)]
struct ChecklistOutput<'a> {
    items: &'a [ChecklistItem],
    capacity: usize,
}

#[derive(Serialize)]
struct ChecklistAddOutput {
    added: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    item: Option<ChecklistItem>,
}

fn item_line(item: &ChecklistItem) -> String {
    let mark = if item.completed { "x" } else { " " };
    format!("[{mark}] {} {}", item.text, short_id(&item.id))
}

fn resolve_item_id(ctx: &Context, raw: &str) -> Result<String> {
    resolve_id(
        ctx.store
            .state()
            .checklist_items
            .iter()
            .map(|item| item.id.as_str()),
        raw,
        Error::ChecklistItemNotFound,
    )
}

pub fn run_add(text: String, common: CommonOptions) -> Result<()> {
    let item = ChecklistItem::new(&text)?;
    let mut ctx = Context::load(&common)?;
    let state = ctx.store.dispatch(Action::AddChecklistItem(item.clone()));
    let added = state.checklist_item(&item.id).is_some();

    let mut human = if added {
        let mut human = HumanOutput::new("Checklist item added");
        human.push_summary("ID", item.id.clone());
        human.push_summary("Text", item.text.clone());
        human
    } else {
        let mut human = HumanOutput::new("Checklist unchanged");
        human.push_warning(format!(
            "the checklist already holds {CHECKLIST_CAPACITY} items; remove one first"
        ));
        human
    };
    human.push_summary(
        "Items",
        format!("{}/{CHECKLIST_CAPACITY}", state.checklist_items.len()),
    );

    emit_success(
        output_options(&common),
        "check add",
        &ChecklistAddOutput {
            added,
            item: added.then_some(item),
        },
        Some(&human),
    )
}

pub fn run_toggle(id: String, common: CommonOptions) -> Result<()> {
    let mut ctx = Context::load(&common)?;
    let id = resolve_item_id(&ctx, &id)?;
    let state = ctx.store.dispatch(Action::ToggleChecklistItem(id.clone()));
    let item = state
        .checklist_item(&id)
        .cloned()
        .ok_or_else(|| Error::ChecklistItemNotFound(id.clone()))?;

    let mut human = HumanOutput::new(if item.completed {
        "Checklist item done"
    } else {
        "Checklist item reopened"
    });
    human.push_detail(item_line(&item));
    emit_success(output_options(&common), "check toggle", &item, Some(&human))
}

pub fn run_rm(id: String, common: CommonOptions) -> Result<()> {
    let mut ctx = Context::load(&common)?;
    let id = resolve_item_id(&ctx, &id)?;
    let state = ctx.store.dispatch(Action::DeleteChecklistItem(id.clone()));

    let mut human = HumanOutput::new("Checklist item deleted");
    human.push_summary("ID", id);
    emit_success(
        output_options(&common),
        "check rm",
        &ChecklistOutput {
            items: &state.checklist_items,
            capacity: CHECKLIST_CAPACITY,
        },
        Some(&human),
    )
}

pub fn run_list(common: CommonOptions) -> Result<()> {
    let ctx = Context::load(&common)?;
    let items = &ctx.store.state().checklist_items;

    let mut human = HumanOutput::new("Quick checklist");
    human.push_summary("Items", format!("{}/{CHECKLIST_CAPACITY}", items.len()));
    for item in items {
        human.push_detail(item_line(item));
    }
    emit_success(
        output_options(&common),
        "check list",
        &ChecklistOutput {
            items,
            capacity: CHECKLIST_CAPACITY,
        },
        Some(&human),
    )
}
