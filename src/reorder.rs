//! Order-merge: move a requested subset of tasks to the front.
//!
//! Ids that match a task are placed first, in the order given. Every task
//! not named keeps its relative order behind them. Unknown ids are dropped.

use std::collections::{HashMap, HashSet};

use crate::model::Task;

/// Apply `ordering` onto `tasks`, returning the merged sequence.
///
/// A repeated id is placed once, at its first position.
pub fn merge_order<S: AsRef<str>>(tasks: &[Task], ordering: &[S]) -> Vec<Task> {
    let by_id: HashMap<&str, &Task> = tasks.iter().map(|task| (task.id.as_str(), task)).collect();

    let mut placed: HashSet<&str> = HashSet::with_capacity(ordering.len());
    let mut merged = Vec::with_capacity(tasks.len());
    for id in ordering {
        if let Some(task) = by_id.get(id.as_ref()) {
            if placed.insert(task.id.as_str()) {
                merged.push((*task).clone());
            }
        }
    }

    merged.extend(
        tasks
            .iter()
            .filter(|task| !placed.contains(task.id.as_str()))
            .cloned(),
    );
    merged
}
