//! trackwise - Personal Task Tracking Library
//!
//! This library provides the core of the trackwise CLI: a pure state
//! reducer over tasks, a quick checklist and task templates, together
//! with the analytics and persistence built around it.
//!
//! # Core Concepts
//!
//! - **Tasks**: titled work items with category, priority, due date and
//!   completion state
//! - **Templates**: reusable bundles of task prototypes, expanded on demand
//! - **Order-merge**: move a requested subset of tasks to the front
//! - **Streak / on-time rate**: analytics over completion timestamps
//! - **Advisor**: optional language-model suggestion for today's order
//!
//! # Module Organization
//!
//! - `model`: entity types and creation-time validation
//! - `state`: tracker state, actions and the transition function
//! - `reorder`: order-merge algorithm
//! - `analytics`: streak, on-time rate, weekly overview, dashboard views
//! - `storage`: persisted format, load with migration, save
//! - `writer`: background persistence writer
//! - `store`: the single-owner store handle (`state` / `dispatch`)
//! - `advisor`: ordering advisor contract, fallback and Ollama client
//! - `config`: configuration loading from `trackwise.toml`
//! - `lock`: file locking and atomic writes
//! - `cli`: command-line interface using clap

pub mod advisor;
pub mod analytics;
pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod model;
pub mod output;
pub mod reorder;
pub mod seed;
pub mod state;
pub mod storage;
pub mod store;
pub mod writer;

pub use error::{Error, Result};
pub use state::{apply, Action, TrackerState};
pub use store::Store;
