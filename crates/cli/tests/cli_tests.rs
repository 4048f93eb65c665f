//! Binary-level tests: arguments in, JSON and exit codes out.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

const TASKS: &str = r#"{
  "tasks": [
    {"id": "TSK-01-01", "title": "Schema", "status": "done [xx]"},
    {"id": "TSK-01-02", "title": "Repository", "status": "[im]", "depends": "TSK-01-01"},
    {"id": "TSK-02-01", "title": "API", "status": "[bd]", "depends": ["TSK-01-02"]},
    {"id": "TSK-02-02", "title": "Client", "category": "defect", "depends": "TSK-02-01"}
  ],
  "groups": [
    {"id": "WP-01", "title": "Storage"},
    {"id": "WP-02", "title": "Service"}
  ]
}"#;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("wbs.json"), TASKS).unwrap();
        Self { dir }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_orchay-graph"));
        cmd.current_dir(self.dir.path())
            .env_remove("ORCHAY_TASKS")
            .env_remove("ORCHAY_GRAPH_CONFIG")
            .env_remove("ORCHAY_LEVEL")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(["--tasks", "wbs.json"])
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).unwrap()
    }
}

#[test]
fn focus_prints_view() {
    let project = Project::new();
    let out = project.json(&["focus", "TSK-01-02", "--depth", "1"]);
    assert_eq!(out["focusTaskId"], "TSK-01-02");
    assert_eq!(out["depth"], 1);
    assert_eq!(
        out["includesNodes"],
        serde_json::json!(["TSK-01-01", "TSK-01-02", "TSK-02-01"])
    );
}

#[test]
fn focus_on_unknown_task_shows_it_alone() {
    let project = Project::new();
    let out = project.json(&["focus", "TSK-99-99"]);
    assert_eq!(out["includesNodes"], serde_json::json!(["TSK-99-99"]));

    project
        .cmd()
        .args(["--tasks", "wbs.json", "focus", "TSK-99-99"])
        .assert()
        .success()
        .stderr(
            predicate::str::contains("Focus task not found")
                .and(predicate::str::contains("TSK-99-99")),
        );
}

#[test]
fn negative_depth_exits_with_cli_error() {
    let project = Project::new();
    project
        .cmd()
        .args(["--tasks", "wbs.json", "focus", "TSK-01-01", "--depth", "-1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("zero or greater"));
}

#[test]
fn levels_and_stats() {
    let project = Project::new();
    let levels = project.json(&["levels"]);
    assert_eq!(levels["levels"]["TSK-02-02"], 3);
    assert_eq!(levels["hasCycles"], false);

    let stats = project.json(&["stats"]);
    assert_eq!(stats, serde_json::json!({"taskCount": 4, "edgeCount": 3}));
}

#[test]
fn view_from_shared_query() {
    let project = Project::new();
    let out = project.json(&[
        "view",
        "--query",
        "hierarchyMode=wp&focusTask=TSK-02-01&focusDepth=1",
        "--collapse",
        "WP-01",
    ]);

    let nodes = out["nodes"].as_array().unwrap();
    let ids: Vec<&str> = nodes.iter().map(|n| n["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["WP-01", "WP-02", "TSK-02-01", "TSK-02-02"]);
    assert_eq!(out["focus"]["focusTaskId"], "TSK-02-01");
}

#[test]
fn view_filters_by_status() {
    let project = Project::new();
    let out = project.json(&["view", "--status", "im,bd"]);
    let ids: Vec<&str> = out["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["TSK-01-02", "TSK-02-01"]);
    assert_eq!(out["edges"][0]["animated"], true);
}

#[test]
fn highlight_classes() {
    let project = Project::new();
    let out = project.json(&["highlight", "TSK-01-02"]);
    assert_eq!(out["TSK-01-01"], "dependsOn");
    assert_eq!(out["TSK-01-02"], "selected");
    assert_eq!(out["TSK-02-02"], "dependedBy");
}

#[test]
fn filter_url_needs_no_task_file() {
    let project = Project::new();
    project
        .cmd()
        .args([
            "filter-url",
            "--category",
            "development,defect",
            "--status",
            "im",
            "--hierarchy",
            "wp",
            "--focus",
            "TSK-06-01",
            "--depth",
            "3",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "categories=development%2Cdefect&statuses=im&hierarchyMode=wp&focusTask=TSK-06-01&focusDepth=3",
        ));
}

#[test]
fn missing_task_file_is_input_error() {
    let project = Project::new();
    project
        .cmd()
        .args(["--tasks", "missing.json", "stats"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn no_task_file_given_is_cli_error() {
    let project = Project::new();
    project.cmd().arg("stats").assert().code(2);
}

#[test]
fn json_flag_wraps_results_and_errors() {
    let project = Project::new();
    let out = project.json(&["--json", "stats"]);
    assert_eq!(out["status"], "ok");
    assert_eq!(out["data"]["taskCount"], 4);

    let output = project
        .cmd()
        .args(["--json", "--tasks", "wbs.json", "view", "--hierarchy", "tree"])
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();
    let envelope: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["error"]["code"], "config");
}

#[test]
fn config_file_supplies_defaults() {
    let project = Project::new();
    fs::write(
        project.dir.path().join("orchay-graph.toml"),
        "tasks = \"wbs.json\"\nfocus-depth = 3\noutput = \"pretty\"\n",
    )
    .unwrap();

    let output = project
        .cmd()
        .args(["focus", "TSK-01-01"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("\n  \"depth\": 3"));

    let out: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(out["includesNodes"].as_array().unwrap().len(), 4);
}

#[test]
fn invalid_config_is_cli_error() {
    let project = Project::new();
    fs::write(project.dir.path().join("orchay-graph.toml"), "colour = \"red\"\n").unwrap();
    project
        .cmd()
        .args(["--tasks", "wbs.json", "stats"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("orchay-graph.toml"));
}

#[test]
fn strict_levels_reject_cycles() {
    let project = Project::new();
    fs::write(
        project.dir.path().join("cyclic.json"),
        r#"{"tasks": [{"id": "A", "depends": "B"}, {"id": "B", "depends": "A"}]}"#,
    )
    .unwrap();

    let out = project
        .cmd()
        .args(["--tasks", "cyclic.json", "levels"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let out: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(out["hasCycles"], true);

    project
        .cmd()
        .args(["--tasks", "cyclic.json", "levels", "--strict"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Cycle detected"));
}

#[test]
fn filter_url_clamps_depth_to_shareable_range() {
    let project = Project::new();
    project
        .cmd()
        .args(["filter-url", "--focus", "TSK-01-01", "--depth", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("focusTask=TSK-01-01&focusDepth=3"))
        .stderr(predicate::str::contains("clamping"));
}
