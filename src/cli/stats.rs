//! trackwise stats command.

use chrono::Local;
use serde::Serialize;

use crate::analytics::{weekly_overview_at, DayLoad, ProductivityStats};
use crate::cli::{output_options, CommonOptions, Context};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

#[derive(Serialize)]
struct StatsOutput {
    #[serde(flatten)]
    stats: ProductivityStats,
    week: Vec<DayLoad>,
}

pub fn run(common: CommonOptions) -> Result<()> {
    let ctx = Context::load(&common)?;
    let now = Local::now();
    let tasks = &ctx.store.state().tasks;

    let stats = ProductivityStats::compute_at(tasks, &now);
    let week = weekly_overview_at(tasks, &now, ctx.config.display.week_starts_on.weekday());

    let mut human = HumanOutput::new("Productivity");
    human.push_summary("Day streak", stats.streak.to_string());
    human.push_summary("On-time rate", format!("{}%", stats.on_time_rate));
    human.push_summary("Completed", stats.total_completed.to_string());
    for day in &week {
        let marker = if day.is_today { " (today)" } else { "" };
        human.push_detail(format!(
            "{} {}: {} due{marker}",
            day.weekday,
            day.date.format("%d %b"),
            day.tasks
        ));
    }

    emit_success(
        output_options(&common),
        "stats",
        &StatsOutput { stats, week },
        Some(&human),
    )
}
