//! End-to-end tests: document in, graph data out.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use orchay_graph_view::{
    GraphFilter, GroupExpansion, Highlight, HierarchyMode, MAX_FOCUS_DEPTH, MIN_FOCUS_DEPTH,
    RequestGeneration, TaskDocument, ViewMessage, ViewNode, build_graph_data, graph_stats,
    highlight_map,
};
use proptest::prelude::*;

const PROJECT: &str = r#"{
  "tasks": [
    {"id": "TSK-01-01", "title": "Schema", "status": "done [xx]", "category": "infrastructure"},
    {"id": "TSK-01-02", "title": "Repository", "status": "implement [im]", "depends": "TSK-01-01"},
    {"id": "TSK-02-01", "title": "API", "status": "basic-design [bd]", "depends": ["TSK-01-02"]},
    {"id": "TSK-02-02", "title": "Auth bug", "status": "[fx]", "category": "defect", "depends": "TSK-02-01, TSK-09-09"},
    {"id": "TSK-03-01", "title": "Docs"}
  ],
  "groups": [
    {"id": "WP-01", "title": "Storage"},
    {"id": "WP-02", "title": "Service"},
    {"id": "WP-04", "title": "Unused"}
  ]
}"#;

fn document() -> TaskDocument {
    TaskDocument::from_json(PROJECT).unwrap()
}

#[test]
fn full_view_of_whole_project() {
    let doc = document();
    let tasks = doc.task_set().unwrap();
    let data = build_graph_data(&tasks, &doc.groups, None, None);

    assert_eq!(data.nodes.len(), 5);
    let edges: Vec<&str> = data.edges.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        edges,
        vec![
            "TSK-01-01-TSK-01-02",
            "TSK-01-02-TSK-02-01",
            "TSK-02-01-TSK-02-02"
        ]
    );

    let stats = graph_stats(&tasks);
    assert_eq!((stats.task_count, stats.edge_count), (5, 3));
}

#[test]
fn shared_link_reproduces_view() {
    let doc = document();
    let tasks = doc.task_set().unwrap();

    let filter = GraphFilter {
        hierarchy_mode: HierarchyMode::Wp,
        ..GraphFilter::default().with_focus("TSK-02-01", 1).unwrap()
    };
    let query = filter.encode_query();
    assert_eq!(query, "hierarchyMode=wp&focusTask=TSK-02-01&focusDepth=1");

    let restored = GraphFilter::parse_query(&query);
    assert_eq!(restored, filter);

    let data = build_graph_data(&tasks, &doc.groups, Some(&restored), None);
    let groups: Vec<&str> = data
        .nodes
        .iter()
        .filter(|n| n.is_group())
        .map(ViewNode::id)
        .collect();
    assert_eq!(groups, vec!["WP-01", "WP-02"]);
    assert_eq!(
        data.task_ids().collect::<Vec<_>>(),
        vec!["TSK-01-02", "TSK-02-01", "TSK-02-02"]
    );
    assert_eq!(data.focus.as_ref().unwrap().len(), 3);
}

#[test]
fn collapsing_through_messages() {
    let doc = document();
    let tasks = doc.task_set().unwrap();
    let filter = GraphFilter {
        hierarchy_mode: HierarchyMode::Wp,
        ..GraphFilter::default()
    };

    let mut expansion = GroupExpansion::new();
    assert!(expansion.apply(ViewMessage::CollapseAll(vec![
        "WP-01".into(),
        "WP-02".into()
    ])));
    let data = build_graph_data(&tasks, &doc.groups, Some(&filter), Some(&expansion));
    assert_eq!(data.task_ids().collect::<Vec<_>>(), vec!["TSK-03-01"]);
    assert!(data.edges.is_empty());

    expansion.apply(ViewMessage::Expand("WP-02".into()));
    let data = build_graph_data(&tasks, &doc.groups, Some(&filter), Some(&expansion));
    assert_eq!(
        data.task_ids().collect::<Vec<_>>(),
        vec!["TSK-02-01", "TSK-02-02", "TSK-03-01"]
    );
    assert_eq!(data.edges.len(), 2);

    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(json["nodes"][0]["type"], "group");
    assert_eq!(json["nodes"][0]["data"]["isExpanded"], false);
    assert_eq!(json["nodes"][0]["data"]["completedCount"], 1);
}

#[test]
fn highlight_selected_dependency_chain() {
    let tasks = document().task_set().unwrap();
    let map = highlight_map(&tasks, Some("TSK-01-02"));
    assert_eq!(map["TSK-01-01"], Highlight::DependsOn);
    assert_eq!(map["TSK-02-02"], Highlight::DependedBy);
    assert_eq!(map["TSK-03-01"], Highlight::Dimmed);
}

#[test]
fn stale_view_results_are_dropped() {
    let doc = document();
    let tasks = doc.task_set().unwrap();
    let generation = RequestGeneration::new();

    let slow = generation.begin();
    let fast = generation.begin();
    let mut shown = None;

    let narrow = GraphFilter::default().with_focus("TSK-03-01", 1).unwrap();
    let fast_data = build_graph_data(&tasks, &doc.groups, Some(&narrow), None);
    assert!(generation.apply_if_current(fast, fast_data, |data| shown = Some(data)));

    let slow_data = build_graph_data(&tasks, &doc.groups, None, None);
    assert!(!generation.apply_if_current(slow, slow_data, |data| shown = Some(data)));

    assert_eq!(shown.unwrap().nodes.len(), 1);
}

proptest! {
    #[test]
    fn parsed_depth_is_always_in_range(raw in "[-+ ]?[0-9]{0,6}[a-z]{0,2}") {
        let filter = GraphFilter::parse_query(&format!("focusTask=T&focusDepth={raw}"));
        prop_assert!((MIN_FOCUS_DEPTH..=MAX_FOCUS_DEPTH).contains(&filter.focus_depth));
    }

    #[test]
    fn encoded_filters_parse_back(
        categories in prop::collection::vec("[a-z]{1,8}", 0..4),
        statuses in prop::collection::vec("[a-z]{2}", 0..4),
        focus in prop::option::of("TSK-[0-9]{2}-[0-9]{2}"),
        depth in 1usize..=3,
    ) {
        let filter = GraphFilter {
            categories,
            statuses: statuses.into_iter().map(|s| format!("[{s}]")).collect(),
            hierarchy_mode: HierarchyMode::Act,
            focus_task: focus,
            focus_depth: depth,
        };
        let restored = GraphFilter::parse_query(&filter.encode_query());
        prop_assert_eq!(&restored.categories, &filter.categories);
        prop_assert_eq!(&restored.statuses, &filter.statuses);
        prop_assert_eq!(restored.hierarchy_mode, filter.hierarchy_mode);
        prop_assert_eq!(&restored.focus_task, &filter.focus_task);
        if filter.focus_task.is_some() {
            prop_assert_eq!(restored.focus_depth, filter.focus_depth);
        }
    }
}
