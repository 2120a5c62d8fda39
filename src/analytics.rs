//! Productivity analytics and dashboard views.
//!
//! Everything here is a pure function of the task collection and a
//! reference moment. Calendar days are taken in the time zone of that
//! moment, so callers pass `Local::now()` for the user's view and a fixed
//! offset in tests.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Utc, Weekday};
use serde::Serialize;

use crate::model::{Category, Priority, Task};

/// Headline numbers shown on the productivity panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductivityStats {
    pub streak: u32,
    pub on_time_rate: u32,
    pub total_completed: usize,
}

impl ProductivityStats {
    pub fn compute(tasks: &[Task]) -> Self {
        Self::compute_at(tasks, &Local::now())
    }

    pub fn compute_at<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Self {
        Self {
            streak: streak_at(tasks, now),
            on_time_rate: on_time_rate_in(tasks, &now.timezone()),
            total_completed: total_completed(tasks),
        }
    }
}

fn local_day<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

/// Consecutive days with at least one completion, ending today or yesterday.
pub fn streak_at<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let today = now.date_naive();

    let days: BTreeSet<NaiveDate> = tasks
        .iter()
        .filter_map(Task::completed_at)
        .map(|at| local_day(at, &tz))
        .collect();

    let mut descending = days.into_iter().rev();
    let Some(latest) = descending.next() else {
        return 0;
    };

    let gap = today.signed_duration_since(latest).num_days();
    if gap != 0 && gap != 1 {
        return 0;
    }

    let mut streak = 1;
    let mut previous = latest;
    for day in descending {
        if previous.signed_duration_since(day).num_days() != 1 {
            break;
        }
        streak += 1;
        previous = day;
    }
    streak
}

/// Whether a completed task was finished on or before its due day.
///
/// Completion at or before the start of the due day, or anywhere within
/// it, both reduce to "completion day <= due day".
fn completed_on_time<Tz: TimeZone>(task: &Task, tz: &Tz) -> Option<bool> {
    let completed = task.completed_at()?;
    Some(local_day(completed, tz) <= local_day(task.due_date, tz))
}

/// Percentage of completed tasks finished on time, rounded. 0 when none.
pub fn on_time_rate_in<Tz: TimeZone>(tasks: &[Task], tz: &Tz) -> u32 {
    let (on_time, completed) = tasks
        .iter()
        .filter_map(|task| completed_on_time(task, tz))
        .fold((0usize, 0usize), |(on_time, total), hit| {
            (on_time + usize::from(hit), total + 1)
        });

    if completed == 0 {
        return 0;
    }
    ((on_time as f64 / completed as f64) * 100.0).round() as u32
}

pub fn total_completed(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| task.is_completed()).count()
}

/// Task count for one day of the weekly overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayLoad {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub tasks: usize,
    pub is_today: bool,
}

/// Tasks due on each day of the week containing `now`.
pub fn weekly_overview_at<Tz: TimeZone>(
    tasks: &[Task],
    now: &DateTime<Tz>,
    week_start: Weekday,
) -> Vec<DayLoad> {
    let tz = now.timezone();
    let today = now.date_naive();
    let offset = (7 + today.weekday().num_days_from_monday()
        - week_start.num_days_from_monday())
        % 7;
    let start = today - Duration::days(i64::from(offset));

    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for task in tasks {
        *per_day.entry(local_day(task.due_date, &tz)).or_default() += 1;
    }

    (0..7)
        .map(|index| {
            let date = start + Duration::days(index);
            DayLoad {
                date,
                weekday: date.weekday(),
                tasks: per_day.get(&date).copied().unwrap_or(0),
                is_today: date == today,
            }
        })
        .collect()
}

/// Optional category and priority filters for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub category: Option<Category>,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.category.map_or(true, |category| task.category == category)
            && self.priority.map_or(true, |priority| task.priority == priority)
    }
}

/// Filtered task list with its pending/completed split.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub tasks: Vec<Task>,
    pub pending: usize,
    pub completed: usize,
}

/// Tasks due on the calendar day of `now`, in stored order.
pub fn tasks_due_today<'a, Tz: TimeZone>(tasks: &'a [Task], now: &DateTime<Tz>) -> Vec<&'a Task> {
    let tz = now.timezone();
    let today = now.date_naive();
    tasks
        .iter()
        .filter(|task| local_day(task.due_date, &tz) == today)
        .collect()
}

/// Build the dashboard list: optionally only today's tasks, then filtered.
pub fn dashboard_at<Tz: TimeZone>(
    tasks: &[Task],
    now: &DateTime<Tz>,
    today_only: bool,
    filter: TaskFilter,
) -> DashboardView {
    let scoped: Vec<&Task> = if today_only {
        tasks_due_today(tasks, now)
    } else {
        tasks.iter().collect()
    };

    let visible: Vec<Task> = scoped
        .into_iter()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect();
    let completed = visible.iter().filter(|task| task.is_completed()).count();

    DashboardView {
        pending: visible.len() - completed,
        completed,
        tasks: visible,
    }
}
