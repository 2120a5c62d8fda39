//! trackwise suggest command.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde::Serialize;

use crate::advisor::{
    suggest_order, OllamaAdvisor, OrderRequest, OrderSuggestion, MIN_TASKS_FOR_SUGGESTION,
};
use crate::cli::{output_options, short_id, CommonOptions, Context};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};

const DISABLED_REASONING: &str =
    "The assistant is disabled in the configuration. Showing the original task order.";

#[derive(Serialize)]
struct SuggestOutput<'a> {
    suggestion: &'a OrderSuggestion,
    applied: bool,
}

pub fn run(apply: bool, common: CommonOptions) -> Result<()> {
    let mut ctx = Context::load(&common)?;
    let request = OrderRequest::for_today(&ctx.store.state().tasks, &Local::now());
    if request.len() < MIN_TASKS_FOR_SUGGESTION {
        return Err(Error::InvalidArgument(format!(
            "need at least {MIN_TASKS_FOR_SUGGESTION} tasks due today to suggest an order"
        )));
    }

    let suggestion = if ctx.config.advisor.enabled {
        let advisor = Arc::new(OllamaAdvisor::new(&ctx.config.advisor));
        let timeout = Duration::from_secs(ctx.config.advisor.timeout_secs);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        tracing::debug!(url = advisor.base_url(), tasks = request.len(), "requesting order");
        runtime.block_on(suggest_order(advisor, request.clone(), timeout))
    } else {
        OrderSuggestion::Fallback {
            ordered_task_ids: request.task_ids(),
            reasoning: DISABLED_REASONING.to_string(),
        }
    };

    if apply {
        ctx.store.dispatch(suggestion.to_action());
    }

    let titles: Vec<(String, String)> = suggestion
        .ordered_task_ids()
        .iter()
        .filter_map(|id| ctx.store.state().task(id))
        .map(|task| (task.title.clone(), short_id(&task.id).to_string()))
        .collect();

    let mut human = HumanOutput::new(if suggestion.is_fallback() {
        "Suggested order (fallback: original order)"
    } else {
        "Suggested order"
    });
    human.push_summary("Reasoning", suggestion.reasoning());
    human.push_summary("Applied", if apply { "yes" } else { "no" });
    for (position, (title, id)) in titles.iter().enumerate() {
        human.push_detail(format!("{}. {title} {id}", position + 1));
    }
    if suggestion.is_fallback() {
        human.push_warning("the assistant could not be used; order left as is");
    }

    emit_success(
        output_options(&common),
        "suggest",
        &SuggestOutput {
            suggestion: &suggestion,
            applied: apply,
        },
        Some(&human),
    )
}
