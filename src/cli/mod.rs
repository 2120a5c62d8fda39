//! Command-line interface for trackwise
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule. Every
//! invocation hydrates the store, dispatches at most one action, and
//! waits for the write to land before exiting.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Category, Priority};
use crate::output::emit_warning;
use crate::storage::{Recovery, Storage};
use crate::store::Store;

mod checklist;
mod init;
mod reset;
mod stats;
mod suggest;
mod task;
mod template;

/// trackwise - personal task tracking
///
/// Track tasks with categories, priorities and due dates, expand reusable
/// templates, follow your completion streak, and ask an assistant for a
/// suggested order for today's work.
#[derive(Parser, Debug)]
#[command(name = "trackwise")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the state file
    #[arg(long, global = true, env = "TRACKWISE_STATE")]
    pub state: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, global = true, env = "TRACKWISE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Quick checklist (at most five items)
    #[command(subcommand)]
    Check(CheckCommands),

    /// Reusable task templates
    #[command(subcommand)]
    Template(TemplateCommands),

    /// Streak, on-time rate and weekly overview
    Stats,

    /// Ask the assistant for an order for today's tasks
    Suggest {
        /// Apply the suggested order to the task list
        #[arg(long)]
        apply: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Replace all state with the seed data
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task
    Add {
        /// Task title (at least 3 characters)
        title: String,

        /// Category: work, school, personal, health
        #[arg(short, long, default_value = "personal")]
        category: String,

        /// Priority: low, medium, high
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Due date (YYYY-MM-DD); defaults to now
        #[arg(short, long)]
        due: Option<String>,
    },

    /// Edit a task
    Edit {
        /// Task id (or unique prefix)
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        priority: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<String>,
    },

    /// Delete a task
    Rm {
        /// Task id (or unique prefix)
        id: String,
    },

    /// Mark a task done, or reopen it
    Toggle {
        /// Task id (or unique prefix)
        id: String,
    },

    /// List tasks
    List {
        /// Only tasks due today
        #[arg(long)]
        today: bool,

        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Filter by priority
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// Move tasks to the front in the given order
    Reorder {
        /// Task ids (or unique prefixes)
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Checklist subcommands
#[derive(Subcommand, Debug)]
pub enum CheckCommands {
    /// Add a checklist item
    Add {
        /// Item text
        text: String,
    },
    /// Toggle a checklist item
    Toggle {
        /// Item id (or unique prefix)
        id: String,
    },
    /// Delete a checklist item
    Rm {
        /// Item id (or unique prefix)
        id: String,
    },
    /// List checklist items
    List,
}

/// Template subcommands
#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// Create a template
    Add {
        /// Template name (at least 3 characters)
        name: String,

        /// Task prototype as "title:category:priority" (repeatable)
        #[arg(short, long = "task", required = true)]
        tasks: Vec<String>,
    },
    /// Delete a template
    Rm {
        /// Template id (or unique prefix)
        id: String,
    },
    /// Add one task per prototype, due now
    Apply {
        /// Template id (or unique prefix)
        id: String,
    },
    /// List templates
    List,
}

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct CommonOptions {
    pub state: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let common = CommonOptions {
            state: self.state,
            config: self.config,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add { title, category, priority, due } => {
                    task::run_add(task::AddOptions { title, category, priority, due, common })
                }
                TaskCommands::Edit { id, title, category, priority, due } => {
                    task::run_edit(task::EditOptions {
                        id,
                        title,
                        category,
                        priority,
                        due,
                        common,
                    })
                }
                TaskCommands::Rm { id } => task::run_rm(task::IdOptions { id, common }),
                TaskCommands::Toggle { id } => task::run_toggle(task::IdOptions { id, common }),
                TaskCommands::List { today, category, priority } => {
                    task::run_list(task::ListOptions { today, category, priority, common })
                }
                TaskCommands::Reorder { ids } => {
                    task::run_reorder(task::ReorderOptions { ids, common })
                }
            },
            Commands::Check(cmd) => match cmd {
                CheckCommands::Add { text } => checklist::run_add(text, common),
                CheckCommands::Toggle { id } => checklist::run_toggle(id, common),
                CheckCommands::Rm { id } => checklist::run_rm(id, common),
                CheckCommands::List => checklist::run_list(common),
            },
            Commands::Template(cmd) => match cmd {
                TemplateCommands::Add { name, tasks } => template::run_add(name, tasks, common),
                TemplateCommands::Rm { id } => template::run_rm(id, common),
                TemplateCommands::Apply { id } => template::run_apply(id, common),
                TemplateCommands::List => template::run_list(common),
            },
            Commands::Stats => stats::run(common),
            Commands::Suggest { apply } => suggest::run(apply, common),
            Commands::Init { force } => init::run(force, common),
            Commands::Reset { yes } => reset::run(yes, common),
        }
    }
}

/// Loaded configuration plus a hydrated store.
pub(crate) struct Context {
    pub config: Config,
    pub store: Store,
}

impl Context {
    pub(crate) fn load(common: &CommonOptions) -> Result<Self> {
        let config = Config::resolve(common.config.as_deref())?;
        let path = config.state_path(common.state.as_deref())?;
        tracing::debug!(path = %path.display(), "opening state");
        let store = Store::hydrate(Storage::new(&path));
        if let Some(recovery) = store.recovery() {
            emit_warning(output_options(common), &recovery_message(&path, recovery));
        }
        Ok(Self { config, store })
    }
}

fn recovery_message(path: &Path, recovery: &Recovery) -> String {
    match recovery {
        Recovery::MovedAside(moved) => format!(
            "state file {} could not be read; it was moved to {} and seed data is in use",
            path.display(),
            moved.display()
        ),
        Recovery::Untouched { reason } => format!(
            "state file {} could not be loaded ({reason}); using seed data, changes will not be saved",
            path.display()
        ),
    }
}

pub(crate) fn output_options(common: &CommonOptions) -> crate::output::OutputOptions {
    crate::output::OutputOptions {
        json: common.json,
        quiet: common.quiet,
    }
}

/// Resolve a full id from an exact id or a unique prefix.
pub(crate) fn resolve_id<'a>(
    ids: impl Iterator<Item = &'a str>,
    raw: &str,
    not_found: fn(String) -> Error,
) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::InvalidArgument("id cannot be empty".to_string()));
    }

    let mut matches = Vec::new();
    for id in ids {
        if id == raw {
            return Ok(id.to_string());
        }
        if id.starts_with(raw) {
            matches.push(id);
        }
    }

    match matches.as_slice() {
        [] => Err(not_found(raw.to_string())),
        [only] => Ok(only.to_string()),
        many => Err(Error::AmbiguousId {
            prefix: raw.to_string(),
            count: many.len(),
        }),
    }
}

pub(crate) fn parse_category(raw: Option<&str>) -> Result<Option<Category>> {
    raw.map(str::parse::<Category>).transpose()
}

pub(crate) fn parse_priority(raw: Option<&str>) -> Result<Option<Priority>> {
    raw.map(str::parse::<Priority>).transpose()
}

/// Parse `YYYY-MM-DD` as local midnight of that day.
pub(crate) fn parse_due_date(raw: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|err| {
        Error::InvalidArgument(format!("invalid due date '{raw}' (expected YYYY-MM-DD): {err}"))
    })?;
    let midnight = date.and_time(NaiveTime::MIN);
    Ok(Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc()))
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub(crate) fn format_local_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d").to_string()
}
