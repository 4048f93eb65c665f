//! Node sets and edges: the inputs every graph query consumes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// A keyed collection of graph nodes supplied by the caller.
///
/// The engine only needs membership tests and iteration; node metadata is
/// opaque to it. Implemented for the standard map types keyed by `String`,
/// and for any caller-owned collection that can answer these questions.
pub trait NodeSet {
    /// Metadata stored per node.
    type Node;

    /// Look up a node by identifier.
    fn get_node(&self, id: &str) -> Option<&Self::Node>;

    /// Iterate over `(identifier, metadata)` pairs.
    fn nodes(&self) -> impl Iterator<Item = (&str, &Self::Node)>;

    /// Number of nodes in the set.
    fn node_count(&self) -> usize;

    /// Whether a node with this identifier exists.
    fn contains_node(&self, id: &str) -> bool {
        self.get_node(id).is_some()
    }

    /// Iterate over node identifiers.
    fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes().map(|(id, _)| id)
    }
}

impl<V, S: BuildHasher> NodeSet for HashMap<String, V, S> {
    type Node = V;

    fn get_node(&self, id: &str) -> Option<&V> {
        self.get(id)
    }

    fn nodes(&self) -> impl Iterator<Item = (&str, &V)> {
        self.iter().map(|(id, node)| (id.as_str(), node))
    }

    fn node_count(&self) -> usize {
        self.len()
    }
}

impl<V> NodeSet for BTreeMap<String, V> {
    type Node = V;

    fn get_node(&self, id: &str) -> Option<&V> {
        self.get(id)
    }

    fn nodes(&self) -> impl Iterator<Item = (&str, &V)> {
        self.iter().map(|(id, node)| (id.as_str(), node))
    }

    fn node_count(&self) -> usize {
        self.len()
    }
}

/// A directed dependency fact between two nodes.
///
/// `source` must complete before `target`: the adjacency index records
/// `source` as a predecessor of `target` and `target` as a successor of
/// `source`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// The upstream node.
    pub source: String,
    /// The downstream node.
    pub target: String,
}

impl Edge {
    /// Create an edge from `source` to `target`.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Stable identifier used by renderers, `"{source}-{target}"`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}-{}", self.source, self.target)
    }
}

/// Trait for node metadata that declares its own dependencies.
///
/// Implement this for task types so their edges can be derived with
/// [`dependency_edges`] instead of being supplied separately.
pub trait TaskNodeData {
    /// Returns the identifiers of the nodes this node depends on.
    fn dependency_names(&self) -> impl Iterator<Item = &str>;
}

/// Derive the edge list from the dependencies each node declares.
///
/// Produces `dependency -> dependent` edges in node-set order. Dependency
/// names that are not themselves in the set are skipped, as are blank names.
#[must_use]
pub fn dependency_edges<N>(nodes: &N) -> Vec<Edge>
where
    N: NodeSet + ?Sized,
    N::Node: TaskNodeData,
{
    let mut edges = Vec::new();
    for (id, node) in nodes.nodes() {
        for dep in node.dependency_names() {
            let dep = dep.trim();
            if !dep.is_empty() && nodes.contains_node(dep) {
                edges.push(Edge::new(dep, id));
            }
        }
    }
    edges
}
