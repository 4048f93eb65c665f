//! Focus views: the bounded neighbourhood of one task.
//!
//! A focus view answers "which tasks lie within `depth` dependency hops of
//! this one", counting hops in either direction. Renderers use it to decide
//! what to show, dim or hide around a selected task.

use crate::{Edge, Error, NodeSet, Result, build_adjacency};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Validated traversal depth for a focus view.
///
/// Depth is a hop count, so negative values coming from loosely typed input
/// are rejected here instead of being clamped inside the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "usize")]
pub struct FocusDepth(usize);

impl FocusDepth {
    /// Wrap an unsigned depth.
    #[must_use]
    pub const fn new(depth: usize) -> Self {
        Self(depth)
    }

    /// The number of hops.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for FocusDepth {
    type Error = Error;

    fn try_from(depth: i64) -> Result<Self> {
        usize::try_from(depth)
            .map(Self)
            .map_err(|_| Error::invalid_depth(depth))
    }
}

impl From<FocusDepth> for usize {
    fn from(depth: FocusDepth) -> Self {
        depth.0
    }
}

impl std::fmt::Display for FocusDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Result of a focus query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusView {
    /// The task the view is centred on.
    pub focus_task_id: String,
    /// Maximum hop count used for the query.
    pub depth: usize,
    /// Every task within `depth` hops, always including the focus task.
    pub includes_nodes: BTreeSet<String>,
}

impl FocusView {
    /// Whether `id` is part of the view.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.includes_nodes.contains(id)
    }

    /// Number of tasks in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.includes_nodes.len()
    }

    /// A view always holds at least its focus task, so this is only true for
    /// a manually constructed empty value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.includes_nodes.is_empty()
    }
}

/// Compute the focus view of `focus_task_id` over `nodes` and `edges`.
///
/// Nodes are collected breadth-first over predecessors and successors alike,
/// so every node at distance `d` is reached before any node at `d + 1`, and
/// each node is processed once even when the graph has cycles.
///
/// When the focus task is not part of `nodes`, a warning is logged and the
/// view contains only the focus identifier; this is not an error.
#[must_use]
pub fn build_focus_graph<N>(focus_task_id: &str, depth: usize, nodes: &N, edges: &[Edge]) -> FocusView
where
    N: NodeSet + ?Sized,
{
    if !nodes.contains_node(focus_task_id) {
        warn!(
            focus_task_id,
            depth, "Focus task not found in node set, showing it alone"
        );
        return FocusView {
            focus_task_id: focus_task_id.to_string(),
            depth,
            includes_nodes: BTreeSet::from([focus_task_id.to_string()]),
        };
    }

    let adjacency = build_adjacency(nodes, edges);
    let includes_nodes: BTreeSet<String> = adjacency
        .bounded_bfs(focus_task_id, depth)
        .into_iter()
        .map(|(id, _)| id.to_string())
        .collect();

    debug!(
        focus_task_id,
        depth,
        included = includes_nodes.len(),
        "Computed focus view"
    );

    FocusView {
        focus_task_id: focus_task_id.to_string(),
        depth,
        includes_nodes,
    }
}

/// [`build_focus_graph`] for depths arriving as signed integers.
///
/// # Errors
///
/// Returns [`Error::InvalidDepth`] when `depth` is negative.
pub fn try_build_focus_graph<N>(
    focus_task_id: &str,
    depth: i64,
    nodes: &N,
    edges: &[Edge],
) -> Result<FocusView>
where
    N: NodeSet + ?Sized,
{
    let depth = FocusDepth::try_from(depth)?;
    Ok(build_focus_graph(focus_task_id, depth.get(), nodes, edges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn nodes(ids: &[&str]) -> HashMap<String, ()> {
        ids.iter().map(|id| ((*id).to_string(), ())).collect()
    }

    fn ids(view: &FocusView) -> Vec<&str> {
        view.includes_nodes.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_linear_chain() {
        let nodes = nodes(&["A", "B", "C", "D"]);
        let edges = [Edge::new("A", "B"), Edge::new("B", "C"), Edge::new("C", "D")];

        let view = build_focus_graph("B", 1, &nodes, &edges);
        assert_eq!(ids(&view), vec!["A", "B", "C"]);

        let view = build_focus_graph("B", 2, &nodes, &edges);
        assert_eq!(ids(&view), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_two_node_cycle_terminates() {
        let nodes = nodes(&["A", "B"]);
        let edges = [Edge::new("A", "B"), Edge::new("B", "A")];

        let view = build_focus_graph("A", 5, &nodes, &edges);
        assert_eq!(ids(&view), vec!["A", "B"]);
    }

    #[test]
    fn test_single_node_no_edges() {
        let nodes = nodes(&["A"]);
        let view = build_focus_graph("A", 3, &nodes, &[]);
        assert_eq!(ids(&view), vec!["A"]);
    }

    #[test]
    fn test_missing_focus_returns_focus_only() {
        let nodes = nodes(&["A", "B"]);
        let view = build_focus_graph("Z", 2, &nodes, &[]);
        assert_eq!(view.focus_task_id, "Z");
        assert_eq!(view.depth, 2);
        assert_eq!(ids(&view), vec!["Z"]);
    }

    #[test]
    fn test_isolated_focus() {
        let nodes = nodes(&["A", "B", "C"]);
        let view = build_focus_graph("C", 3, &nodes, &[Edge::new("A", "B")]);
        assert_eq!(ids(&view), vec!["C"]);
    }

    #[test]
    fn test_depth_zero_is_focus_only() {
        let nodes = nodes(&["A", "B", "C"]);
        let edges = [Edge::new("A", "B"), Edge::new("B", "C")];
        let view = build_focus_graph("B", 0, &nodes, &edges);
        assert_eq!(ids(&view), vec!["B"]);
    }

    #[test]
    fn test_direction_is_ignored() {
        // B depends on A, C depends on B; from C both upstream hops count.
        let nodes = nodes(&["A", "B", "C", "X"]);
        let edges = [Edge::new("A", "B"), Edge::new("B", "C"), Edge::new("C", "X")];
        let view = build_focus_graph("C", 2, &nodes, &edges);
        assert_eq!(ids(&view), vec!["A", "B", "C", "X"]);
    }

    #[test]
    fn test_dangling_edge_does_not_add_nodes() {
        let nodes = nodes(&["A", "B"]);
        let edges = [Edge::new("A", "B"), Edge::new("B", "ghost")];
        let view = build_focus_graph("A", 3, &nodes, &edges);
        assert_eq!(ids(&view), vec!["A", "B"]);
    }

    #[test]
    fn test_try_build_rejects_negative_depth() {
        let nodes = nodes(&["A"]);
        let err = try_build_focus_graph("A", -1, &nodes, &[]).unwrap_err();
        assert_eq!(err, Error::InvalidDepth { depth: -1 });
    }

    #[test]
    fn test_try_build_accepts_zero() {
        let nodes = nodes(&["A"]);
        let view = try_build_focus_graph("A", 0, &nodes, &[]).unwrap();
        assert_eq!(view.depth, 0);
    }

    #[test]
    fn test_focus_depth_serde() {
        let depth: FocusDepth = serde_json::from_str("3").unwrap();
        assert_eq!(depth.get(), 3);
        assert!(serde_json::from_str::<FocusDepth>("-2").is_err());
        assert_eq!(serde_json::to_string(&depth).unwrap(), "3");
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let nodes = nodes(&["A"]);
        let view = build_focus_graph("A", 1, &nodes, &[]);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["focusTaskId"], "A");
        assert_eq!(json["includesNodes"], serde_json::json!(["A"]));
    }
}
