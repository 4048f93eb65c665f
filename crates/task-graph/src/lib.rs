//! Task dependency graph algorithms for orchay.
//!
//! This crate turns a caller-owned set of tasks and their dependency edges
//! into the structures a dependency-graph view needs: a bidirectional
//! adjacency index, bounded "focus" neighbourhoods, and layout levels.
//! Every query is a pure function of its inputs; nothing is cached between
//! calls.
//!
//! # Key Types
//!
//! - [`NodeSet`]: Trait for the keyed task collection a query runs over
//! - [`Edge`]: A `source -> target` dependency (target depends on source)
//! - [`AdjacencyIndex`]: Predecessor and successor lists per node
//! - [`FocusView`]: The tasks within a hop bound of a focus task
//!
//! # Example
//!
//! ```
//! use orchay_task_graph::{Edge, build_focus_graph};
//! use std::collections::HashMap;
//!
//! let nodes: HashMap<String, ()> = ["A", "B", "C", "D"]
//!     .into_iter()
//!     .map(|id| (id.to_string(), ()))
//!     .collect();
//! let edges = vec![Edge::new("A", "B"), Edge::new("B", "C"), Edge::new("C", "D")];
//!
//! let view = build_focus_graph("B", 1, &nodes, &edges);
//! assert!(view.contains("A") && view.contains("C"));
//! assert!(!view.contains("D"));
//! ```

mod adjacency;
mod error;
mod focus;
mod levels;
mod node;
mod validation;

pub use adjacency::{AdjacencyIndex, AdjacencyRecord, build_adjacency};
pub use error::{Error, Result};
pub use focus::{FocusDepth, FocusView, build_focus_graph, try_build_focus_graph};
pub use levels::{calculate_levels, has_cycles};
pub use node::{Edge, NodeSet, TaskNodeData, dependency_edges};
pub use validation::{ValidationResult, validate};
