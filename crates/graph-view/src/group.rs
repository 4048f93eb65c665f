//! Work package and activity groups.
//!
//! A task's group is derived from its id: `TSK-01-02-03` belongs to work
//! package `WP-01` and activity `ACT-01-02`. Groups are laid out as columns,
//! catalogue groups first, with their tasks stacked underneath.

use crate::filter::HierarchyMode;
use crate::state::GroupExpansion;
use crate::task::{GroupInfo, TaskRecord, TaskSet};
use crate::view::{Position, grid};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Width of one group column.
pub const GROUP_COLUMN_WIDTH: f64 = 300.0;

/// Vertical distance between tasks of a group.
pub const GROUP_ROW_SPACING: f64 = 100.0;

const TASK_OFFSET_X: f64 = 120.0;
const GROUP_OFFSET_X: f64 = -100.0;
const DEFAULT_ACTIVITY: &str = "01";

/// Kind of grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Work package, `WP-xx`.
    Wp,
    /// Activity, `ACT-xx-yy`.
    Act,
}

impl GroupKind {
    /// Grouping used by a hierarchy mode; `None` for `full`.
    #[must_use]
    pub const fn from_mode(mode: HierarchyMode) -> Option<Self> {
        match mode {
            HierarchyMode::Full => None,
            HierarchyMode::Wp => Some(Self::Wp),
            HierarchyMode::Act => Some(Self::Act),
        }
    }

    /// Group a task id belongs to, or `None` for ids with no `-` separator.
    #[must_use]
    pub fn group_id(self, task_id: &str) -> Option<String> {
        let mut parts = task_id.split('-').skip(1);
        let package = parts.next()?;
        Some(match self {
            Self::Wp => format!("WP-{package}"),
            Self::Act => {
                let activity = parts
                    .next()
                    .filter(|part| !part.is_empty())
                    .unwrap_or(DEFAULT_ACTIVITY);
                format!("ACT-{package}-{activity}")
            }
        })
    }
}

/// What a group node displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCard {
    /// Group identifier.
    pub group_id: String,
    /// Work package or activity.
    pub group_type: GroupKind,
    /// Catalogue title, or the id when the catalogue has none.
    pub title: String,
    /// Tasks in the group.
    pub task_count: usize,
    /// Tasks in the group that are done.
    pub completed_count: usize,
    /// Whether the group's tasks are shown.
    pub is_expanded: bool,
    /// Ids of the group's tasks.
    pub child_task_ids: Vec<String>,
}

/// A group with its canvas position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedGroup {
    /// Display data.
    pub card: GroupCard,
    /// Left of the first child column, at the children's mean height.
    pub position: Position,
}

/// A task with its canvas position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTask<'a> {
    /// The task.
    pub task: &'a TaskRecord,
    /// Where to draw it.
    pub position: Position,
}

/// Groups and tasks laid out in columns.
#[derive(Debug, Clone, Default)]
pub struct GroupLayout<'a> {
    /// Non-empty groups, catalogue order first.
    pub groups: Vec<PlacedGroup>,
    /// Every task, grouped ones first; ungrouped tasks share a final column.
    pub tasks: Vec<PlacedTask<'a>>,
}

impl GroupLayout<'_> {
    /// Ids of tasks whose group is collapsed.
    #[must_use]
    pub fn hidden_task_ids(&self) -> HashSet<&str> {
        self.groups
            .iter()
            .filter(|group| !group.card.is_expanded)
            .flat_map(|group| group.card.child_task_ids.iter().map(String::as_str))
            .collect()
    }
}

struct Bucket<'a, 'c> {
    id: String,
    title: Option<&'c str>,
    tasks: Vec<&'a TaskRecord>,
}

/// Assign tasks to groups and lay both out.
///
/// Catalogue entries with no tasks are dropped. Groups that tasks reference
/// but the catalogue lacks are appended after the catalogue groups, titled
/// with their id.
#[must_use]
pub fn build_groups<'a, 'c>(
    kind: GroupKind,
    tasks: &'a TaskSet,
    catalogue: &'c [GroupInfo],
    expansion: Option<&GroupExpansion>,
) -> GroupLayout<'a> {
    let mut buckets: Vec<Bucket<'a, 'c>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for info in catalogue {
        if index.contains_key(&info.id) {
            continue;
        }
        index.insert(info.id.clone(), buckets.len());
        buckets.push(Bucket {
            id: info.id.clone(),
            title: Some(info.title.as_str()).filter(|title| !title.is_empty()),
            tasks: Vec::new(),
        });
    }

    let mut ungrouped = Vec::new();
    for task in tasks.iter() {
        let Some(group_id) = kind.group_id(&task.id) else {
            ungrouped.push(task);
            continue;
        };
        let slot = *index.entry(group_id.clone()).or_insert_with(|| {
            buckets.push(Bucket {
                id: group_id,
                title: None,
                tasks: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[slot].tasks.push(task);
    }

    let mut layout = GroupLayout::default();
    for (column, bucket) in buckets.into_iter().filter(|b| !b.tasks.is_empty()).enumerate() {
        let first_child = layout.tasks.len();
        layout.tasks.extend(place_column(column, &bucket.tasks));
        let children = &layout.tasks[first_child..];
        #[allow(clippy::cast_precision_loss)]
        let mean_y = children.iter().map(|placed| placed.position.y).sum::<f64>()
            / children.len() as f64;

        let is_expanded = expansion.is_none_or(|state| state.is_expanded(&bucket.id));
        layout.groups.push(PlacedGroup {
            position: Position::new(grid(column, GROUP_COLUMN_WIDTH, GROUP_OFFSET_X), mean_y),
            card: GroupCard {
                title: bucket.title.unwrap_or(&bucket.id).to_string(),
                task_count: bucket.tasks.len(),
                completed_count: bucket.tasks.iter().filter(|t| t.is_done()).count(),
                is_expanded,
                child_task_ids: bucket.tasks.iter().map(|t| t.id.clone()).collect(),
                group_id: bucket.id,
                group_type: kind,
            },
        });
    }

    if !ungrouped.is_empty() {
        debug!(count = ungrouped.len(), "Tasks without a group");
        let column = layout.groups.len();
        layout.tasks.extend(place_column(column, &ungrouped));
    }

    layout
}

fn place_column<'a>(
    column: usize,
    tasks: &[&'a TaskRecord],
) -> impl Iterator<Item = PlacedTask<'a>> {
    let x = grid(column, GROUP_COLUMN_WIDTH, TASK_OFFSET_X);
    tasks.iter().enumerate().map(move |(row, &task)| PlacedTask {
        task,
        position: Position::new(x, grid(row, GROUP_ROW_SPACING, 0.0)),
    })
}
