//! Bidirectional adjacency index over a node set and edge list.
//!
//! The index borrows node identifiers from the caller's node set, so it is
//! cheap to build per query and is dropped with it.

use crate::{Edge, NodeSet};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Neighbours of a single node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyRecord<'a> {
    /// Nodes this node depends on, in edge order.
    pub predecessors: Vec<&'a str>,
    /// Nodes that depend on this node, in edge order.
    pub successors: Vec<&'a str>,
}

/// Per-node predecessor and successor lists.
///
/// Every node of the source node set has an entry, including nodes that no
/// edge touches. Edges whose endpoints are not both in the node set are not
/// represented.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex<'a> {
    records: HashMap<&'a str, AdjacencyRecord<'a>>,
}

/// Build the adjacency index for `nodes` and `edges`.
///
/// Runs in `O(|nodes| + |edges|)`. Edges with an unknown endpoint are skipped
/// without any signal.
#[must_use]
pub fn build_adjacency<'a, N>(nodes: &'a N, edges: &[Edge]) -> AdjacencyIndex<'a>
where
    N: NodeSet + ?Sized,
{
    let mut records: HashMap<&'a str, AdjacencyRecord<'a>> =
        HashMap::with_capacity(nodes.node_count());
    for id in nodes.node_ids() {
        records.entry(id).or_default();
    }

    let mut skipped = 0_usize;
    for edge in edges {
        // Resolve both endpoints to keys borrowed from the node set.
        let source = records.get_key_value(edge.source.as_str()).map(|(k, _)| *k);
        let target = records.get_key_value(edge.target.as_str()).map(|(k, _)| *k);

        let (Some(source), Some(target)) = (source, target) else {
            skipped += 1;
            continue;
        };

        if let Some(record) = records.get_mut(source) {
            record.successors.push(target);
        }
        if let Some(record) = records.get_mut(target) {
            record.predecessors.push(source);
        }
    }

    debug!(
        nodes = records.len(),
        edges = edges.len(),
        skipped_edges = skipped,
        "Built adjacency index"
    );

    AdjacencyIndex { records }
}

impl<'a> AdjacencyIndex<'a> {
    /// Neighbour record for `id`, if it is part of the index.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AdjacencyRecord<'a>> {
        self.records.get(id)
    }

    /// Whether `id` has an entry.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Number of nodes in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all `(id, record)` entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &AdjacencyRecord<'a>)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    /// Breadth-first walk from `start` over predecessors and successors alike,
    /// stopping expansion at `max_depth` hops.
    ///
    /// Returns each reached node exactly once together with its hop distance,
    /// in discovery order, so distances never decrease along the result.
    /// `start` is always the first entry even when it is not in the index.
    #[must_use]
    pub fn bounded_bfs<'s>(&self, start: &'s str, max_depth: usize) -> Vec<(&'s str, usize)>
    where
        'a: 's,
    {
        self.walk(start, max_depth, |record| {
            record.predecessors.iter().chain(record.successors.iter())
        })
    }

    /// All nodes `id` transitively depends on, nearest first. Excludes `id`.
    #[must_use]
    pub fn upstream(&self, id: &str) -> Vec<&'a str> {
        self.closure(id, |record| record.predecessors.iter())
    }

    /// All nodes that transitively depend on `id`, nearest first. Excludes `id`.
    #[must_use]
    pub fn downstream(&self, id: &str) -> Vec<&'a str> {
        self.closure(id, |record| record.successors.iter())
    }

    fn closure<'r, F, I>(&'r self, id: &str, neighbours: F) -> Vec<&'a str>
    where
        F: Fn(&'r AdjacencyRecord<'a>) -> I,
        I: Iterator<Item = &'r &'a str>,
    {
        let Some((&start, _)) = self.records.get_key_value(id) else {
            return Vec::new();
        };
        self.walk(start, usize::MAX, neighbours)
            .into_iter()
            .skip(1)
            .map(|(node, _)| node)
            .collect()
    }

    fn walk<'r, 's, F, I>(&'r self, start: &'s str, max_depth: usize, neighbours: F) -> Vec<(&'s str, usize)>
    where
        'a: 's,
        F: Fn(&'r AdjacencyRecord<'a>) -> I,
        I: Iterator<Item = &'r &'a str>,
    {
        let mut visited: HashSet<&'s str> = HashSet::new();
        let mut order = Vec::new();
        let mut queue: VecDeque<(&'s str, usize)> = VecDeque::new();
        queue.push_back((start, 0));

        while let Some((node, depth)) = queue.pop_front() {
            // The same node can be queued along several paths before it is
            // first dequeued; only the first dequeue counts.
            if !visited.insert(node) {
                continue;
            }
            order.push((node, depth));

            if depth >= max_depth {
                continue;
            }

            if let Some(record) = self.records.get(node) {
                for &next in neighbours(record) {
                    if !visited.contains(next) {
                        queue.push_back((next, depth + 1));
                    }
                }
            }
        }

        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn nodes(ids: &[&str]) -> BTreeMap<String, ()> {
        ids.iter().map(|id| ((*id).to_string(), ())).collect()
    }

    #[test]
    fn test_every_node_gets_a_record() {
        let nodes = nodes(&["a", "b", "c"]);
        let index = build_adjacency(&nodes, &[Edge::new("a", "b")]);

        assert_eq!(index.len(), 3);
        let isolated = index.get("c").unwrap();
        assert!(isolated.predecessors.is_empty());
        assert!(isolated.successors.is_empty());
    }

    #[test]
    fn test_edge_direction() {
        let nodes = nodes(&["a", "b"]);
        let index = build_adjacency(&nodes, &[Edge::new("a", "b")]);

        assert_eq!(index.get("a").unwrap().successors, vec!["b"]);
        assert!(index.get("a").unwrap().predecessors.is_empty());
        assert_eq!(index.get("b").unwrap().predecessors, vec!["a"]);
        assert!(index.get("b").unwrap().successors.is_empty());
    }

    #[test]
    fn test_dangling_edges_are_ignored() {
        let nodes = nodes(&["a"]);
        let index = build_adjacency(&nodes, &[Edge::new("a", "ghost"), Edge::new("ghost", "a")]);

        assert_eq!(index.len(), 1);
        assert!(!index.contains("ghost"));
        assert_eq!(index.get("a").unwrap(), &AdjacencyRecord::default());
    }

    #[test]
    fn test_empty_inputs() {
        let nodes = nodes(&[]);
        let index = build_adjacency(&nodes, &[]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let nodes = nodes(&["a", "b"]);
        let edges = [Edge::new("a", "b"), Edge::new("a", "b")];
        let index = build_adjacency(&nodes, &edges);
        assert_eq!(index.get("a").unwrap().successors, vec!["b", "b"]);
    }

    #[test]
    fn test_bounded_bfs_distances() {
        let nodes = nodes(&["a", "b", "c", "d"]);
        let edges = [Edge::new("a", "b"), Edge::new("b", "c"), Edge::new("c", "d")];
        let index = build_adjacency(&nodes, &edges);

        let order = index.bounded_bfs("b", 2);
        assert_eq!(order[0], ("b", 0));
        let distances: HashMap<&str, usize> = order.into_iter().collect();
        assert_eq!(distances["a"], 1);
        assert_eq!(distances["c"], 1);
        assert_eq!(distances["d"], 2);
    }

    #[test]
    fn test_bounded_bfs_visits_each_node_once_on_cycle() {
        let nodes = nodes(&["a", "b", "c"]);
        let edges = [Edge::new("a", "b"), Edge::new("b", "c"), Edge::new("c", "a")];
        let index = build_adjacency(&nodes, &edges);

        let order = index.bounded_bfs("a", 10);
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_upstream_and_downstream() {
        let nodes = nodes(&["a", "b", "c", "d"]);
        let edges = [Edge::new("a", "b"), Edge::new("b", "c"), Edge::new("d", "c")];
        let index = build_adjacency(&nodes, &edges);

        let mut up = index.upstream("c");
        up.sort_unstable();
        assert_eq!(up, vec!["a", "b", "d"]);
        assert_eq!(index.downstream("a"), vec!["b", "c"]);
        assert!(index.downstream("c").is_empty());
        assert!(index.upstream("missing").is_empty());
    }
}
