//! Integration tests for graph validation (V001–V005, W001–W005).

#[allow(dead_code)]
mod helpers;

use helpers::*;
use recipe_graph::config::LayoutConfig;
use recipe_graph::lower::linear_to_graph;
use recipe_graph::validate::validate_graph;
use serde_json::json;

#[test]
fn branching_graph_is_clean() {
    init_tracing();
    let report = validate_graph(&branching_graph());
    assert!(report.valid, "{:?}", report.errors);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn opened_recipe_is_clean() {
    let graph = linear_to_graph(&ticket_triage(), &LayoutConfig::default());
    let report = validate_graph(&graph);
    assert!(report.valid);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn v001_cycle_blocks() {
    let graph = wired(&["fetch", "summarize"], &[("fetch", "summarize"), ("summarize", "fetch")]);
    let report = validate_graph(&graph);
    assert!(!report.valid);
    assert_eq!(
        report.error_messages(),
        vec!["Workflow contains cycles; all workflows must be acyclic"]
    );
}

#[test]
fn v001_self_loop_is_a_cycle() {
    let graph = wired(&["a"], &[("a", "a")]);
    let report = validate_graph(&graph);
    assert_eq!(codes(&report.errors), vec!["V001"]);
}

#[test]
fn v002_v003_missing_name_and_step_id() {
    let mut graph = wired(&["a", "b"], &[("a", "b")]);
    graph.nodes[0].data.name = "   ".into();
    graph.nodes[1].data.step_id = String::new();
    let report = validate_graph(&graph);
    assert!(!report.valid);
    assert_eq!(codes(&report.errors), vec!["V002", "V003"]);
    assert_eq!(report.errors[0].node_id.as_deref(), Some("node-a"));
    assert_eq!(report.errors[1].node_id.as_deref(), Some("node-b"));
    assert_eq!(report.errors[1].message, "Node \"node-b\" has no step ID.");
}

#[test]
fn v004_duplicate_step_id() {
    let mut graph = wired(&["a", "b"], &[("a", "b")]);
    graph.nodes[1].data.step_id = "a".into();
    let report = validate_graph(&graph);
    assert_eq!(codes(&report.errors), vec!["V004"]);
    assert_eq!(report.errors[0].node_id.as_deref(), Some("node-b"));
}

#[test]
fn v005_duplicate_node_id() {
    let mut graph = wired(&["a", "b"], &[("a", "b")]);
    graph.nodes[1].id = "node-a".into();
    let report = validate_graph(&graph);
    assert!(codes(&report.errors).contains(&"V005"), "{:?}", report.errors);
}

#[test]
fn w001_orphan_is_a_warning_only() {
    let graph = wired(&["a", "b", "c"], &[("a", "b")]);
    let report = validate_graph(&graph);
    assert!(report.valid);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].code, "W001");
    assert_eq!(report.warnings[0].node_id.as_deref(), Some("node-c"));
    assert_eq!(report.warnings[0].message, "Node \"C\" is not connected to the workflow.");
}

#[test]
fn single_node_is_not_an_orphan() {
    let report = validate_graph(&wired(&["solo"], &[]));
    assert!(report.valid);
    assert!(report.warnings.is_empty());
}

#[test]
fn w002_unknown_step_reference() {
    let graph = graph(
        vec![
            node("fetch"),
            llm_node(
                "summarize",
                json!({ "user_prompt": "Summarize {{steps.missing_id.output.x}}" }),
            ),
        ],
        vec![edge("fetch", "summarize")],
    );
    let report = validate_graph(&graph);
    assert!(report.valid);
    assert_eq!(codes(&report.warnings), vec!["W002"]);
    assert!(report.warnings[0].message.contains("steps.missing_id.output.x"));
    assert_eq!(report.warnings[0].node_id.as_deref(), Some("node-summarize"));
}

#[test]
fn input_references_are_not_checked() {
    let graph = graph(
        vec![llm_node(
            "greet",
            json!({ "system_prompt": "Hi {{customer_name}}", "user_prompt": "{{ input.body }}" }),
        )],
        vec![],
    );
    let report = validate_graph(&graph);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn w003_malformed_step_reference() {
    let graph = graph(
        vec![node("fetch"), llm_node("use", json!({ "user_prompt": "{{steps.fetch.result}}" }))],
        vec![edge("fetch", "use")],
    );
    let report = validate_graph(&graph);
    assert_eq!(codes(&report.warnings), vec!["W003"]);
}

#[test]
fn w004_reference_without_edge_path() {
    // `summary` reads `fetch`, but the only edge runs the other way.
    let graph = graph(
        vec![
            node("fetch"),
            llm_node("summary", json!({ "user_prompt": "{{steps.fetch.output.text}}" })),
        ],
        vec![edge("summary", "fetch")],
    );
    let report = validate_graph(&graph);
    assert!(report.valid);
    assert_eq!(codes(&report.warnings), vec!["W004"]);
}

#[test]
fn w004_transitive_path_counts() {
    let graph = graph(
        vec![
            node("a"),
            node("b"),
            llm_node("c", json!({ "user_prompt": "{{steps.a.output}}" })),
        ],
        vec![edge("a", "b"), edge("b", "c")],
    );
    assert!(validate_graph(&graph).warnings.is_empty());
}

#[test]
fn w004_self_reference() {
    let looped = llm_node("loop", json!({ "user_prompt": "{{steps.loop.output}}" }));
    let graph = graph(vec![looped], vec![]);
    assert_eq!(codes(&validate_graph(&graph).warnings), vec!["W004"]);
}

#[test]
fn references_in_extra_fields_are_scanned() {
    let graph = graph(
        vec![llm_node("a", json!({ "examples": [{ "input": "{{steps.nope.output}}" }] }))],
        vec![],
    );
    assert_eq!(codes(&validate_graph(&graph).warnings), vec!["W002"]);
}

#[test]
fn w005_dangling_edge() {
    let graph = graph(vec![node("a")], vec![edge("a", "ghost")]);
    let report = validate_graph(&graph);
    assert!(report.valid);
    assert_eq!(codes(&report.warnings), vec!["W005"]);
}

#[test]
fn checks_accumulate_in_order() {
    let mut graph = graph(
        vec![
            node("a"),
            node("b"),
            llm_node("c", json!({ "user_prompt": "{{steps.zzz.output}}" })),
            node("d"),
        ],
        vec![edge("a", "b"), edge("b", "a"), edge("b", "c")],
    );
    graph.nodes[1].data.name = String::new();
    let report = validate_graph(&graph);
    assert_eq!(codes(&report.errors), vec!["V001", "V002"]);
    assert_eq!(codes(&report.warnings), vec!["W001", "W002"]);
}

#[test]
fn report_serializes_for_the_host() {
    let report = validate_graph(&wired(&["a", "b", "c"], &[("a", "b")]));
    insta::assert_json_snapshot!(report, @r###"
    {
      "valid": true,
      "errors": [],
      "warnings": [
        {
          "code": "W001",
          "phase": "Validate",
          "severity": "warning",
          "message": "Node \"C\" is not connected to the workflow.",
          "nodeId": "node-c"
        }
      ]
    }
    "###);
}
