//! Integration tests for the compile pass: graph ⇄ linear step list.

#[allow(dead_code)]
mod helpers;

use helpers::*;
use recipe_graph::config::LayoutConfig;
use recipe_graph::lower::{self, graph_to_linear, linear_to_graph};
use recipe_graph::parse::{Position, StepType};

#[test]
fn linear_recipe_round_trips() {
    let recipe = ticket_triage();
    let graph = linear_to_graph(&recipe, &LayoutConfig::default());
    let steps = graph_to_linear(&graph).expect("chain graph is acyclic");
    assert_eq!(steps, recipe.steps);
}

#[test]
fn chain_layout_is_single_column() {
    let recipe = ticket_triage();
    let graph = linear_to_graph(&recipe, &LayoutConfig::default());

    let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["node-classify", "node-extract", "node-reply"]);
    let positions: Vec<Position> = graph.nodes.iter().map(|n| n.position).collect();
    assert_eq!(
        positions,
        vec![
            Position::new(100.0, 100.0),
            Position::new(100.0, 250.0),
            Position::new(100.0, 400.0),
        ]
    );
    assert_eq!(graph.metadata.name, "Support Ticket Triage");
    assert_eq!(graph.metadata.category, "support");

    insta::assert_json_snapshot!(graph.edges, @r###"
    [
      {
        "id": "edge-node-classify-node-extract",
        "source": "node-classify",
        "target": "node-extract",
        "type": "smoothstep"
      },
      {
        "id": "edge-node-extract-node-reply",
        "source": "node-extract",
        "target": "node-reply",
        "type": "smoothstep"
      }
    ]
    "###);
}

#[test]
fn custom_layout_spacing() {
    let layout = LayoutConfig {
        x: 40.0,
        vertical_spacing: 80.0,
        base_offset: 0.0,
    };
    let steps = vec![step("a", StepType::Audio), step("b", StepType::Transform)];
    let graph = linear_to_graph(&recipe(steps), &layout);
    assert_eq!(graph.nodes[1].position, Position::new(40.0, 80.0));
}

#[test]
fn empty_and_single_step_recipes() {
    let graph = linear_to_graph(&recipe(vec![]), &LayoutConfig::default());
    assert!(graph.nodes.is_empty() && graph.edges.is_empty());
    assert!(graph_to_linear(&graph).unwrap().is_empty());

    let only = recipe(vec![step("only", StepType::LlmCall)]);
    let graph = linear_to_graph(&only, &LayoutConfig::default());
    assert_eq!(graph.nodes.len(), 1);
    assert!(graph.edges.is_empty());
}

#[test]
fn every_edge_points_forward() {
    let graph = branching_graph();
    let steps = graph_to_linear(&graph).unwrap();
    let position = |node_id: &str| {
        let step_id = &graph.node(node_id).unwrap().data.step_id;
        steps.iter().position(|s| &s.id == step_id).unwrap()
    };
    for edge in &graph.edges {
        assert!(
            position(&edge.source) < position(&edge.target),
            "edge {} runs backwards",
            edge.id
        );
    }
}

#[test]
fn branching_order_follows_insertion() {
    let steps = graph_to_linear(&branching_graph()).unwrap();
    insta::assert_json_snapshot!(step_ids(&steps), @r###"
    [
      "transcribe",
      "sentiment",
      "topics",
      "report"
    ]
    "###);
}

#[test]
fn ordering_is_deterministic() {
    let graph = wired(
        &["e", "d", "c", "b", "a"],
        &[("a", "b"), ("c", "b"), ("e", "a"), ("d", "c")],
    );
    let first = graph_to_linear(&graph).unwrap();
    for _ in 0..10 {
        assert_eq!(graph_to_linear(&graph).unwrap(), first);
    }
    assert_eq!(step_ids(&first), vec!["e", "d", "a", "c", "b"]);
}

#[test]
fn steps_drop_editor_fields() {
    let steps = graph_to_linear(&branching_graph()).unwrap();
    let value = serde_json::to_value(&steps[0]).unwrap();
    assert_eq!(value["id"], "transcribe");
    assert_eq!(value["type"], "audio");
    assert_eq!(value["operation"], "transcribe");
    assert!(value.get("position").is_none());
    assert!(value.get("stepId").is_none());
}

#[test]
fn mutual_edges_are_a_cycle() {
    let json = include_str!("fixtures/cycle_graph.json");
    let graph = recipe_graph::parse::parse_graph(json).unwrap();
    let err = graph_to_linear(&graph).unwrap_err();
    assert_eq!(err.nodes, vec!["node-fetch", "node-summarize"]);
    assert!(err.to_string().starts_with("Workflow contains cycles"));
}

#[test]
fn fetch_then_summarize_scenario() {
    let mut graph = wired(&["fetch", "summarize"], &[("fetch", "summarize")]);
    assert_eq!(step_ids(&graph_to_linear(&graph).unwrap()), vec!["fetch", "summarize"]);

    // Reverse the edge, then add the original direction back.
    graph.edges = vec![edge("summarize", "fetch")];
    assert_eq!(step_ids(&graph_to_linear(&graph).unwrap()), vec!["summarize", "fetch"]);
    graph.edges.push(edge("fetch", "summarize"));
    assert!(graph_to_linear(&graph).is_err());
}

#[test]
fn config_cannot_shadow_step_identity() {
    let json = serde_json::json!({
        "nodes": [{
            "id": "node-real",
            "type": "llm_call",
            "position": { "x": 0, "y": 0 },
            "data": {
                "stepId": "real",
                "name": "Real",
                "stepType": "llm_call",
                "config": { "user_prompt": "hi", "id": "shadow", "type": "audio" }
            }
        }],
        "edges": []
    });
    let errors = recipe_graph::parse::parse_graph(&json.to_string()).unwrap_err();
    assert_eq!(errors[0].code, "P001");
    assert!(errors[0].message.contains("'id'"), "{}", errors[0]);

    // Every step the compiler emits reads back as the same step.
    let steps = graph_to_linear(&branching_graph()).unwrap();
    for step in &steps {
        let text = serde_json::to_string(step).unwrap();
        let reparsed: recipe_graph::Step = serde_json::from_str(&text).unwrap();
        assert_eq!(&reparsed, step);
    }
}

#[test]
fn graph_to_recipe_carries_metadata() {
    let draft = lower::graph_to_recipe(&branching_graph()).unwrap();
    assert_eq!(draft.metadata.name, "Call Review");
    assert_eq!(draft.steps.len(), 4);

    let mut recipe = ticket_triage();
    recipe.apply_draft(draft);
    assert_eq!(recipe.slug, "ticket-triage");
    assert_eq!(recipe.name, "Call Review");
}
