//! Task records and the ordered task set the view is built from.

use crate::{Error, Result};
use orchay_task_graph::{NodeSet, TaskNodeData};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Status code of a task that has not started.
pub const DEFAULT_STATUS: &str = "[ ]";

/// Status code of a finished task.
pub const DONE_STATUS: &str = "[xx]";

/// Category assumed when a task does not declare one.
pub const DEFAULT_CATEGORY: &str = "development";

static STATUS_CODE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\[[\w\s]*\]").ok());

/// Extract the bracketed status code from a status label.
///
/// `"basic-design [bd]"` yields `"[bd]"`; a missing or code-less status
/// yields [`DEFAULT_STATUS`].
#[must_use]
pub fn extract_status_code(status: Option<&str>) -> &str {
    status
        .and_then(|s| STATUS_CODE.as_ref()?.find(s))
        .map_or(DEFAULT_STATUS, |m| m.as_str())
}

/// Display name for a status code. Unknown codes are returned as-is.
#[must_use]
pub fn status_name(code: &str) -> &str {
    match code {
        "[ ]" => "Todo",
        "[bd]" => "Basic Design",
        "[dd]" => "Detailed Design",
        "[im]" => "Implementation",
        "[vf]" => "Verification",
        "[xx]" => "Done",
        "[an]" => "Analysis",
        "[fx]" => "Fix",
        "[ds]" => "Design",
        other => other,
    }
}

/// Display name for a category. Unknown categories are returned as-is.
#[must_use]
pub fn category_name(category: &str) -> &str {
    match category {
        "development" => "Development",
        "defect" => "Defect",
        "infrastructure" => "Infrastructure",
        other => other,
    }
}

/// A task as it appears in a WBS document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Task identifier, e.g. `TSK-06-01`.
    pub id: String,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// Status label, usually carrying a bracketed code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Category such as `development` or `defect`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Assigned person.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Identifiers of the tasks this one depends on.
    ///
    /// Accepts either a list or a comma-separated string.
    #[serde(default, deserialize_with = "deserialize_depends")]
    pub depends: Vec<String>,
}

impl TaskRecord {
    /// Create a task with an id and title and no other attributes.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: None,
            category: None,
            assignee: None,
            depends: Vec::new(),
        }
    }

    /// Set the status label.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the dependencies.
    #[must_use]
    pub fn with_depends<I, S>(mut self, depends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends = depends.into_iter().map(Into::into).collect();
        self
    }

    /// The bracketed status code.
    #[must_use]
    pub fn status_code(&self) -> &str {
        extract_status_code(self.status.as_deref())
    }

    /// The category, defaulting to [`DEFAULT_CATEGORY`].
    #[must_use]
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }

    /// Whether the task is finished.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status_code() == DONE_STATUS
    }
}

impl TaskNodeData for TaskRecord {
    fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.depends.iter().map(String::as_str)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DependsField {
    Text(String),
    List(Vec<String>),
}

fn deserialize_depends<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<String> = match Option::<DependsField>::deserialize(deserializer)? {
        None => return Ok(Vec::new()),
        Some(DependsField::Text(text)) => text.split(',').map(str::to_string).collect(),
        Some(DependsField::List(list)) => list,
    };
    Ok(items
        .into_iter()
        .map(|dep| dep.trim().to_string())
        .filter(|dep| !dep.is_empty())
        .collect())
}

/// A work package or activity that tasks can be grouped under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    /// Group identifier, e.g. `WP-01` or `ACT-01-02`.
    pub id: String,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
}

/// Tasks in document order, indexed by id.
///
/// Document order drives layout, so this is used instead of a hash map.
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    tasks: Vec<TaskRecord>,
    index: HashMap<String, usize>,
}

impl TaskSet {
    /// Build a set from records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTask`] if two records share an id.
    pub fn new(tasks: impl IntoIterator<Item = TaskRecord>) -> Result<Self> {
        let mut set = Self::default();
        for task in tasks {
            if set.index.contains_key(&task.id) {
                return Err(Error::duplicate_task(task.id));
            }
            set.index.insert(task.id.clone(), set.tasks.len());
            set.tasks.push(task);
        }
        Ok(set)
    }

    /// Look up a task.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TaskRecord> {
        self.index.get(id).map(|&i| &self.tasks[i])
    }

    /// Whether a task with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Iterate over tasks in document order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.iter()
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Keep only tasks matching `keep`, preserving order.
    #[must_use]
    pub fn filtered(&self, mut keep: impl FnMut(&TaskRecord) -> bool) -> Self {
        let mut set = Self::default();
        for task in &self.tasks {
            if !keep(task) {
                continue;
            }
            set.index.insert(task.id.clone(), set.tasks.len());
            set.tasks.push(task.clone());
        }
        set
    }
}

impl NodeSet for TaskSet {
    type Node = TaskRecord;

    fn get_node(&self, id: &str) -> Option<&TaskRecord> {
        self.get(id)
    }

    fn nodes(&self) -> impl Iterator<Item = (&str, &TaskRecord)> {
        self.tasks.iter().map(|task| (task.id.as_str(), task))
    }

    fn node_count(&self) -> usize {
        self.tasks.len()
    }
}

/// The JSON document a project exports: tasks plus the group catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDocument {
    /// All tasks of the project.
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    /// Work packages and activities.
    #[serde(default)]
    pub groups: Vec<GroupInfo>,
}

impl TaskDocument {
    /// Parse a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Index the tasks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTask`] if two tasks share an id.
    pub fn task_set(&self) -> Result<TaskSet> {
        TaskSet::new(self.tasks.iter().cloned())
    }
}
