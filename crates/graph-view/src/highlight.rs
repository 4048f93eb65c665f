//! Highlight classes for a selected task.

use crate::task::TaskSet;
use orchay_task_graph::{NodeSet, build_adjacency, dependency_edges};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// How a task is drawn relative to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Highlight {
    /// The selected task.
    Selected,
    /// A task the selection depends on, directly or transitively.
    DependsOn,
    /// A task that depends on the selection, directly or transitively.
    DependedBy,
    /// Unrelated to the selection.
    Dimmed,
    /// Nothing is selected.
    Normal,
}

/// Classify every task against `selected`.
///
/// With no selection, or a selection that is not in `tasks`, every task is
/// [`Highlight::Normal`].
#[must_use]
pub fn highlight_map(tasks: &TaskSet, selected: Option<&str>) -> BTreeMap<String, Highlight> {
    let mut classes: BTreeMap<String, Highlight> = tasks
        .node_ids()
        .map(|id| (id.to_string(), Highlight::Normal))
        .collect();

    let Some(selected) = selected else {
        return classes;
    };
    if !tasks.contains(selected) {
        warn!(selected, "Selected task not found, clearing highlights");
        return classes;
    }

    let edges = dependency_edges(tasks);
    let adjacency = build_adjacency(tasks, &edges);
    classes.values_mut().for_each(|class| *class = Highlight::Dimmed);
    for id in adjacency.downstream(selected) {
        classes.insert(id.to_string(), Highlight::DependedBy);
    }
    // A cycle puts a task on both sides; upstream wins.
    for id in adjacency.upstream(selected) {
        classes.insert(id.to_string(), Highlight::DependsOn);
    }
    classes.insert(selected.to_string(), Highlight::Selected);
    classes
}
