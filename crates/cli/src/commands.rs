//! Command execution.
//!
//! Each command reads the loaded task file and returns a serializable
//! result; printing is left to the caller.

use crate::cli::CliError;
use orchay_graph_view::{
    GraphFilter, GroupExpansion, TaskDocument, TaskSet, ViewMessage, build_graph_data,
    graph_stats, highlight_map,
};
use orchay_task_graph::{build_focus_graph, calculate_levels, dependency_edges, validate};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info_span, warn};

/// A fully resolved command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Focus view around `task`.
    Focus {
        /// Centre task.
        task: String,
        /// Hop bound.
        depth: usize,
    },
    /// Topological levels.
    Levels {
        /// Fail instead of warning when the graph has cycles.
        strict: bool,
    },
    /// Graph canvas data.
    View {
        /// Filter to apply.
        filter: GraphFilter,
        /// Groups drawn collapsed.
        collapsed: Vec<String>,
    },
    /// Highlight classes.
    Highlight {
        /// Selected task.
        task: String,
    },
    /// Counts.
    Stats,
    /// Filter encoded as a query string.
    FilterUrl {
        /// Filter to encode.
        filter: GraphFilter,
    },
}

impl Command {
    /// Name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Focus { .. } => "focus",
            Self::Levels { .. } => "levels",
            Self::View { .. } => "view",
            Self::Highlight { .. } => "highlight",
            Self::Stats => "stats",
            Self::FilterUrl { .. } => "filter-url",
        }
    }

    /// Whether the command reads the task file.
    #[must_use]
    pub const fn needs_tasks(&self) -> bool {
        !matches!(self, Self::FilterUrl { .. })
    }
}

/// A parsed and indexed task file.
#[derive(Debug, Clone)]
pub struct TaskInput {
    /// The document as read.
    pub document: TaskDocument,
    /// Its tasks, indexed.
    pub tasks: TaskSet,
}

impl TaskInput {
    /// Parse task file contents.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or duplicate task ids.
    pub fn from_json(json: &str) -> Result<Self, CliError> {
        let document = TaskDocument::from_json(json)?;
        let tasks = document.task_set()?;
        debug!(
            tasks = tasks.len(),
            groups = document.groups.len(),
            "Loaded task document"
        );
        Ok(Self { document, tasks })
    }

    /// Read and parse a task file.
    ///
    /// # Errors
    ///
    /// Fails when the file is unreadable or invalid.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let json = fs::read_to_string(path).map_err(|e| {
            CliError::input_with_help(
                format!("Failed to read task file {}: {e}", path.display()),
                "Check the --tasks path",
            )
        })?;
        Self::from_json(&json)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LevelsOutput {
    levels: BTreeMap<String, usize>,
    has_cycles: bool,
}

#[derive(Serialize)]
struct FilterUrlOutput<'a> {
    query: String,
    filter: &'a GraphFilter,
}

/// Run `command` against `input`.
///
/// # Errors
///
/// Fails when a command that needs tasks gets no input, or when the result
/// cannot be serialized.
pub fn execute(command: &Command, input: Option<&TaskInput>) -> Result<Value, CliError> {
    let span = info_span!(
        "command",
        command = command.name(),
        correlation_id = %crate::tracing::correlation_id(),
    );
    let _guard = span.enter();

    match command {
        Command::FilterUrl { filter } => to_json(&FilterUrlOutput {
            query: filter.encode_query(),
            filter,
        }),
        Command::Focus { task, depth } => {
            let tasks = &require(input)?.tasks;
            let edges = dependency_edges(tasks);
            to_json(&build_focus_graph(task, *depth, tasks, &edges))
        }
        Command::Levels { strict } => {
            let tasks = &require(input)?.tasks;
            let edges = dependency_edges(tasks);
            let mut validation = validate(tasks, &edges);
            if *strict && let Some(err) = validation.errors.pop() {
                return Err(err.into());
            }
            for err in &validation.errors {
                warn!(%err, "Task graph is not acyclic");
            }
            to_json(&LevelsOutput {
                levels: calculate_levels(tasks, &edges).into_iter().collect(),
                has_cycles: !validation.is_valid,
            })
        }
        Command::View { filter, collapsed } => {
            let input = require(input)?;
            let mut expansion = GroupExpansion::new();
            expansion.apply(ViewMessage::CollapseAll(collapsed.clone()));
            to_json(&build_graph_data(
                &input.tasks,
                &input.document.groups,
                Some(filter),
                Some(&expansion),
            ))
        }
        Command::Highlight { task } => {
            to_json(&highlight_map(&require(input)?.tasks, Some(task.as_str())))
        }
        Command::Stats => to_json(&graph_stats(&require(input)?.tasks)),
    }
}

fn require(input: Option<&TaskInput>) -> Result<&TaskInput, CliError> {
    input.ok_or_else(|| CliError::other("Task input required"))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, CliError> {
    serde_json::to_value(value)
        .map_err(|e| CliError::other(format!("Failed to serialize result: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchay_graph_view::HierarchyMode;

    const TASKS: &str = r#"{
        "tasks": [
            {"id": "TSK-01-01", "title": "A"},
            {"id": "TSK-01-02", "title": "B", "depends": "TSK-01-01"},
            {"id": "TSK-02-01", "title": "C", "depends": "TSK-01-02"},
            {"id": "TSK-02-02", "title": "D", "depends": "TSK-02-01", "status": "[xx]"}
        ],
        "groups": [{"id": "WP-01", "title": "First"}]
    }"#;

    fn input() -> TaskInput {
        TaskInput::from_json(TASKS).unwrap()
    }

    #[test]
    fn test_focus() {
        let out = execute(
            &Command::Focus {
                task: "TSK-01-02".into(),
                depth: 1,
            },
            Some(&input()),
        )
        .unwrap();
        assert_eq!(out["focusTaskId"], "TSK-01-02");
        assert_eq!(
            out["includesNodes"],
            serde_json::json!(["TSK-01-01", "TSK-01-02", "TSK-02-01"])
        );
    }

    #[test]
    fn test_levels() {
        let out = execute(&Command::Levels { strict: true }, Some(&input())).unwrap();
        assert_eq!(out["levels"]["TSK-02-02"], 3);
        assert_eq!(out["hasCycles"], false);
    }

    #[test]
    fn test_levels_with_cycle() {
        let input = TaskInput::from_json(
            r#"{"tasks":[{"id":"A","depends":"B"},{"id":"B","depends":"A"},{"id":"C"}]}"#,
        )
        .unwrap();

        let out = execute(&Command::Levels { strict: false }, Some(&input)).unwrap();
        assert_eq!(out["hasCycles"], true);
        assert_eq!(out["levels"]["C"], 0);

        let err = execute(&Command::Levels { strict: true }, Some(&input)).unwrap_err();
        assert!(matches!(err, CliError::Input { .. }));
    }

    #[test]
    fn test_view_collapses_groups() {
        let command = Command::View {
            filter: GraphFilter {
                hierarchy_mode: HierarchyMode::Wp,
                ..GraphFilter::default()
            },
            collapsed: vec!["WP-01".into()],
        };
        let out = execute(&command, Some(&input())).unwrap();
        let nodes = out["nodes"].as_array().unwrap();
        // WP-01, WP-02 and the two WP-02 tasks.
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0]["data"]["isExpanded"], false);
        assert_eq!(nodes[1]["data"]["title"], "WP-02");
    }

    #[test]
    fn test_stats_and_highlight() {
        let out = execute(&Command::Stats, Some(&input())).unwrap();
        assert_eq!(out, serde_json::json!({"taskCount": 4, "edgeCount": 3}));

        let out = execute(
            &Command::Highlight {
                task: "TSK-02-01".into(),
            },
            Some(&input()),
        )
        .unwrap();
        assert_eq!(out["TSK-01-01"], "dependsOn");
        assert_eq!(out["TSK-02-02"], "dependedBy");
        assert_eq!(out["TSK-02-01"], "selected");
    }

    #[test]
    fn test_filter_url_needs_no_input() {
        let filter = GraphFilter::default().with_focus("TSK-01-01", 3).unwrap();
        let command = Command::FilterUrl { filter };
        assert!(!command.needs_tasks());
        let out = execute(&command, None).unwrap();
        assert_eq!(out["query"], "focusTask=TSK-01-01&focusDepth=3");
        assert!(Command::Stats.needs_tasks());
    }

    #[test]
    fn test_missing_input_is_error() {
        assert!(execute(&Command::Stats, None).is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = TaskInput::from_json(r#"{"tasks":[{"id":"A"},{"id":"A"}]}"#).unwrap_err();
        assert!(matches!(err, CliError::Input { .. }));
    }
}
