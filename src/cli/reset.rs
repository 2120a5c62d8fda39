//! trackwise reset command.

use chrono::Utc;
use serde::Serialize;

use crate::cli::{output_options, CommonOptions, Context};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::seed::seed_state;
use crate::state::Action;

#[derive(Serialize)]
struct ResetOutput {
    tasks: usize,
    checklist_items: usize,
    templates: usize,
}

pub fn run(yes: bool, common: CommonOptions) -> Result<()> {
    if !yes {
        return Err(Error::InvalidArgument(
            "reset replaces all tasks, checklist items and templates; pass --yes to confirm"
                .to_string(),
        ));
    }

    let mut ctx = Context::load(&common)?;
    let state = ctx
        .store
        .dispatch(Action::SetInitialState(seed_state(Utc::now())));

    let output = ResetOutput {
        tasks: state.tasks.len(),
        checklist_items: state.checklist_items.len(),
        templates: state.templates.len(),
    };
    let mut human = HumanOutput::new("State reset to seed data");
    human.push_summary("Tasks", output.tasks.to_string());
    human.push_summary("Checklist items", output.checklist_items.to_string());
    human.push_summary("Templates", output.templates.to_string());
    emit_success(output_options(&common), "reset", &output, Some(&human))
}
