//! Dependency graph view model for orchay.
//!
//! Turns a project's task records into what a dependency-graph canvas
//! draws: filtered and focused task nodes, optional work package or
//! activity groups, laid-out positions, edges, and highlight classes.
//! Filters round-trip through URL query strings so a view can be shared.
//!
//! View state (group expansion, in-flight request ordering) is owned by the
//! caller and passed in explicitly; nothing here is global.
//!
//! # Example
//!
//! ```
//! use orchay_graph_view::{GraphFilter, TaskDocument, build_graph_data};
//!
//! let doc = TaskDocument::from_json(
//!     r#"{"tasks":[
//!         {"id":"TSK-01-01","title":"Schema"},
//!         {"id":"TSK-01-02","title":"API","depends":"TSK-01-01"}
//!     ]}"#,
//! )?;
//! let tasks = doc.task_set()?;
//!
//! let filter = GraphFilter::parse_query("focusTask=TSK-01-02&focusDepth=1");
//! let data = build_graph_data(&tasks, &doc.groups, Some(&filter), None);
//! assert_eq!(data.nodes.len(), 2);
//! assert_eq!(data.edges[0].id, "TSK-01-01-TSK-01-02");
//! # Ok::<(), orchay_graph_view::Error>(())
//! ```

mod error;
mod filter;
mod group;
mod highlight;
mod state;
mod task;
mod view;

pub use error::{Error, Result};
pub use filter::{
    DEFAULT_FOCUS_DEPTH, GraphFilter, HierarchyMode, MAX_FOCUS_DEPTH, MAX_QUERY_LEN,
    MIN_FOCUS_DEPTH,
};
pub use group::{GroupCard, GroupKind, GroupLayout, PlacedGroup, PlacedTask, build_groups};
pub use highlight::{Highlight, highlight_map};
pub use state::{GroupExpansion, RequestGeneration, RequestToken, ViewMessage};
pub use task::{
    DEFAULT_CATEGORY, DEFAULT_STATUS, DONE_STATUS, GroupInfo, TaskDocument, TaskRecord, TaskSet,
    category_name, extract_status_code, status_name,
};
pub use view::{
    GraphData, GraphStats, Position, TaskCard, ViewEdge, ViewNode, build_graph_data, graph_stats,
};
