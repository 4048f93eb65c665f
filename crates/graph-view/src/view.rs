//! Graph data for the dependency view: positioned nodes plus edges.

use crate::filter::{GraphFilter, HierarchyMode};
use crate::group::{GroupCard, GroupKind, build_groups};
use crate::state::GroupExpansion;
use crate::task::{GroupInfo, TaskRecord, TaskSet, category_name, status_name};
use orchay_task_graph::{Edge, FocusView, build_focus_graph, calculate_levels, dependency_edges};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Horizontal distance between topological levels.
pub const LEVEL_SPACING: f64 = 280.0;

/// Vertical distance between tasks sharing a level.
pub const ROW_SPACING: f64 = 140.0;

/// A canvas position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// `index * step + offset` as a coordinate.
#[allow(clippy::cast_precision_loss)] // grid indices are far below 2^52
pub(crate) fn grid(index: usize, step: f64, offset: f64) -> f64 {
    (index as f64).mul_add(step, offset)
}

/// What a task node displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCard {
    /// Task identifier.
    pub task_id: String,
    /// Task title.
    pub title: String,
    /// Bracketed status code.
    pub status: String,
    /// Display name of the status.
    pub status_name: String,
    /// Category, defaulted.
    pub category: String,
    /// Display name of the category.
    pub category_name: String,
    /// Assigned person.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Declared dependencies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,
}

impl From<&TaskRecord> for TaskCard {
    fn from(task: &TaskRecord) -> Self {
        let status = task.status_code();
        let category = task.category_or_default();
        Self {
            task_id: task.id.clone(),
            title: task.title.clone(),
            status: status.to_string(),
            status_name: status_name(status).to_string(),
            category: category.to_string(),
            category_name: category_name(category).to_string(),
            assignee: task.assignee.clone(),
            depends: task.depends.clone(),
        }
    }
}

/// A node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ViewNode {
    /// A single task.
    Task {
        /// Task identifier.
        id: String,
        /// Where to draw it.
        position: Position,
        /// What to draw.
        data: TaskCard,
    },
    /// A work package or activity.
    Group {
        /// Group identifier.
        id: String,
        /// Where to draw it.
        position: Position,
        /// What to draw.
        data: GroupCard,
    },
}

impl ViewNode {
    /// Task node for `task` at `position`.
    #[must_use]
    pub fn task(task: &TaskRecord, position: Position) -> Self {
        Self::Task {
            id: task.id.clone(),
            position,
            data: TaskCard::from(task),
        }
    }

    /// Node identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Task { id, .. } | Self::Group { id, .. } => id,
        }
    }

    /// Node position.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::Task { position, .. } | Self::Group { position, .. } => *position,
        }
    }

    /// Whether this is a group node.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self, Self::Group { .. })
    }
}

/// A drawn dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewEdge {
    /// `source-target`.
    pub id: String,
    /// The dependency.
    pub source: String,
    /// The dependent task.
    pub target: String,
    /// Set while the dependent task is unfinished.
    pub animated: bool,
}

impl ViewEdge {
    fn new(edge: Edge, tasks: &TaskSet) -> Self {
        let animated = tasks.get(&edge.target).is_none_or(|task| !task.is_done());
        Self {
            id: edge.id(),
            source: edge.source,
            target: edge.target,
            animated,
        }
    }
}

/// Everything the graph canvas renders.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphData {
    /// Group nodes first (if any), then task nodes.
    pub nodes: Vec<ViewNode>,
    /// Dependency edges.
    pub edges: Vec<ViewEdge>,
    /// The focus view applied, if one was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<FocusView>,
}

impl GraphData {
    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&ViewNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Ids of task nodes, in draw order.
    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|node| !node.is_group())
            .map(ViewNode::id)
    }
}

/// Size of the unfiltered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    /// Number of tasks.
    pub task_count: usize,
    /// Number of dependencies between tasks of the set.
    pub edge_count: usize,
}

/// Count the tasks and in-set dependencies.
#[must_use]
pub fn graph_stats(tasks: &TaskSet) -> GraphStats {
    GraphStats {
        task_count: tasks.len(),
        edge_count: dependency_edges(tasks).len(),
    }
}

/// Build the graph canvas contents.
///
/// Tasks are narrowed by the filter's categories and statuses, then by its
/// focus view when the focus task survived that narrowing. In `full` mode
/// tasks are laid out by topological level; in `wp`/`act` mode they are
/// laid out in group columns and tasks of collapsed groups are hidden.
#[must_use]
pub fn build_graph_data(
    tasks: &TaskSet,
    groups: &[GroupInfo],
    filter: Option<&GraphFilter>,
    expansion: Option<&GroupExpansion>,
) -> GraphData {
    let mut visible = match filter {
        Some(filter) => tasks.filtered(|task| filter.matches(task)),
        None => tasks.clone(),
    };

    let mut focus = None;
    if let Some(filter) = filter
        && let Some(focus_id) = filter.focus_task.as_deref()
    {
        if visible.contains(focus_id) {
            let edges = dependency_edges(&visible);
            let view = build_focus_graph(focus_id, filter.focus_depth, &visible, &edges);
            visible = visible.filtered(|task| view.contains(&task.id));
            focus = Some(view);
        } else {
            debug!(focus_task = focus_id, "Focus task filtered out, ignoring focus");
        }
    }

    let mode = filter.map_or(HierarchyMode::Full, |filter| filter.hierarchy_mode);
    let mut data = match GroupKind::from_mode(mode) {
        Some(kind) => grouped_layout(kind, &visible, groups, expansion),
        None => level_layout(&visible),
    };
    data.focus = focus;

    debug!(
        %mode,
        nodes = data.nodes.len(),
        edges = data.edges.len(),
        "Built graph data"
    );
    data
}

fn level_layout(tasks: &TaskSet) -> GraphData {
    let edges = dependency_edges(tasks);
    let levels = calculate_levels(tasks, &edges);

    let mut rows: HashMap<usize, usize> = HashMap::new();
    let nodes = tasks
        .iter()
        .map(|task| {
            let level = levels.get(&task.id).copied().unwrap_or(0);
            let row = rows.entry(level).or_insert(0);
            let position = Position::new(
                grid(level, LEVEL_SPACING, 0.0),
                grid(*row, ROW_SPACING, 0.0),
            );
            *row += 1;
            ViewNode::task(task, position)
        })
        .collect();

    GraphData {
        nodes,
        edges: edges.into_iter().map(|edge| ViewEdge::new(edge, tasks)).collect(),
        focus: None,
    }
}

fn grouped_layout(
    kind: GroupKind,
    tasks: &TaskSet,
    groups: &[GroupInfo],
    expansion: Option<&GroupExpansion>,
) -> GraphData {
    let layout = build_groups(kind, tasks, groups, expansion);
    let hidden = layout.hidden_task_ids();

    let mut nodes: Vec<ViewNode> = Vec::with_capacity(layout.groups.len() + layout.tasks.len());
    nodes.extend(layout.groups.iter().map(|group| ViewNode::Group {
        id: group.card.group_id.clone(),
        position: group.position,
        data: group.card.clone(),
    }));
    nodes.extend(
        layout
            .tasks
            .iter()
            .filter(|placed| !hidden.contains(placed.task.id.as_str()))
            .map(|placed| ViewNode::task(placed.task, placed.position)),
    );

    let mut seen = HashSet::new();
    let edges = dependency_edges(tasks)
        .into_iter()
        .filter(|edge| {
            !(hidden.contains(edge.source.as_str()) && hidden.contains(edge.target.as_str()))
        })
        .filter(|edge| seen.insert(edge.id()))
        .map(|edge| ViewEdge::new(edge, tasks))
        .collect();

    GraphData {
        nodes,
        edges,
        focus: None,
    }
}
