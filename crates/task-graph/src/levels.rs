//! Layered layout levels for dependency graphs.
//!
//! Levels place every task one column to the right of its furthest
//! dependency. The graph is built with petgraph so the same structure also
//! answers cycle queries.

use crate::{Edge, NodeSet};
use petgraph::Direction;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

/// Directed graph over borrowed node identifiers.
struct DependencyGraph<'a> {
    graph: DiGraph<&'a str, ()>,
    order: Vec<NodeIndex>,
}

impl<'a> DependencyGraph<'a> {
    fn build<N>(nodes: &'a N, edges: &[Edge]) -> Self
    where
        N: NodeSet + ?Sized,
    {
        let mut graph = DiGraph::with_capacity(nodes.node_count(), edges.len());
        let mut name_to_node: HashMap<&'a str, NodeIndex> = HashMap::new();
        let mut order = Vec::with_capacity(nodes.node_count());

        for id in nodes.node_ids() {
            let index = graph.add_node(id);
            name_to_node.insert(id, index);
            order.push(index);
        }

        for edge in edges {
            if let (Some(&from), Some(&to)) = (
                name_to_node.get(edge.source.as_str()),
                name_to_node.get(edge.target.as_str()),
            ) {
                graph.add_edge(from, to, ());
            }
        }

        Self { graph, order }
    }
}

/// Assign a layout level to every node.
///
/// Nodes without in-set dependencies sit at level 0; every other node sits at
/// least one level past each dependency processed before it. Nodes that are
/// never reached because every path to them runs through a cycle are placed
/// one level past the deepest assigned node, and a warning is logged for each.
#[must_use]
pub fn calculate_levels<N>(nodes: &N, edges: &[Edge]) -> HashMap<String, usize>
where
    N: NodeSet + ?Sized,
{
    let deps = DependencyGraph::build(nodes, edges);
    let graph = &deps.graph;

    let mut in_degree: HashMap<NodeIndex, usize> = deps
        .order
        .iter()
        .map(|&index| (index, graph.edges_directed(index, Direction::Incoming).count()))
        .collect();
    let mut levels: HashMap<NodeIndex, usize> = HashMap::new();
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();

    for &index in &deps.order {
        if in_degree.get(&index) == Some(&0) {
            queue.push_back(index);
            levels.insert(index, 0);
        }
    }

    while let Some(current) = queue.pop_front() {
        let current_level = levels.get(&current).copied().unwrap_or(0);

        for edge in graph.edges_directed(current, Direction::Outgoing) {
            let neighbour = edge.target();

            let remaining = in_degree.entry(neighbour).or_insert(1);
            *remaining = remaining.saturating_sub(1);
            let ready = *remaining == 0;

            let level = levels.entry(neighbour).or_insert(0);
            *level = (*level).max(current_level + 1);

            if ready {
                queue.push_back(neighbour);
            }
        }
    }

    let max_level = levels.values().copied().max().unwrap_or(0);
    let mut result = HashMap::with_capacity(deps.order.len());
    for &index in &deps.order {
        let id = graph[index];
        let level = if let Some(&level) = levels.get(&index) {
            level
        } else {
            warn!(task_id = id, "Dependency cycle detected, placing task after all levels");
            max_level + 1
        };
        result.insert(id.to_string(), level);
    }

    debug!(nodes = result.len(), max_level, "Calculated layout levels");
    result
}

/// Whether the in-set edges form at least one directed cycle.
#[must_use]
pub fn has_cycles<N>(nodes: &N, edges: &[Edge]) -> bool
where
    N: NodeSet + ?Sized,
{
    is_cyclic_directed(&DependencyGraph::build(nodes, edges).graph)
}
