use recipe_graph::parse::*;
use serde_json::{Value, json};

// =============================================================================
// Graph builders
// =============================================================================

/// Node `node-<step_id>` holding an llm_call step with the given config.
pub fn llm_node(step_id: &str, config: Value) -> RecipeNode {
    RecipeNode {
        id: format!("node-{}", step_id),
        position: Position::default(),
        data: NodeData {
            step_id: step_id.into(),
            name: step_id.to_uppercase(),
            config: StepConfig::from_value(StepType::LlmCall, config).unwrap(),
        },
    }
}

/// Node `node-<step_id>` with an empty llm_call config.
pub fn node(step_id: &str) -> RecipeNode {
    llm_node(step_id, json!({}))
}

/// Edge between `node-<source>` and `node-<target>`.
pub fn edge(source: &str, target: &str) -> RecipeEdge {
    RecipeEdge {
        id: format!("edge-{}-{}", source, target),
        source: format!("node-{}", source),
        target: format!("node-{}", target),
        kind: DEFAULT_EDGE_TYPE.into(),
    }
}

pub fn graph(nodes: Vec<RecipeNode>, edges: Vec<RecipeEdge>) -> RecipeGraph {
    RecipeGraph {
        nodes,
        edges,
        metadata: RecipeMetadata {
            name: "Test Recipe".into(),
            ..Default::default()
        },
    }
}

/// Graph of empty llm_call nodes wired by step id pairs.
pub fn wired(step_ids: &[&str], edges: &[(&str, &str)]) -> RecipeGraph {
    graph(
        step_ids.iter().map(|id| node(id)).collect(),
        edges.iter().map(|(s, t)| edge(s, t)).collect(),
    )
}

// =============================================================================
// Linear builders
// =============================================================================

pub fn step(id: &str, step_type: StepType) -> Step {
    Step::new(id, id.to_uppercase(), StepConfig::default_for(step_type))
}

pub fn recipe(steps: Vec<Step>) -> LinearRecipe {
    LinearRecipe {
        slug: "test-recipe".into(),
        name: "Test Recipe".into(),
        category: "general".into(),
        version: "1.0.0".into(),
        input_schema: json!({ "type": "object" }),
        output_schema: json!({ "type": "object" }),
        steps,
        ..Default::default()
    }
}

pub fn ticket_triage() -> LinearRecipe {
    parse_recipe(include_str!("../fixtures/ticket_triage_recipe.json"))
        .expect("fixture should parse")
}

pub fn branching_graph() -> RecipeGraph {
    parse_graph(include_str!("../fixtures/branching_graph.json")).expect("fixture should parse")
}

// =============================================================================
// Assertions
// =============================================================================

pub fn step_ids(steps: &[Step]) -> Vec<&str> {
    steps.iter().map(|s| s.id.as_str()).collect()
}

pub fn object(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

pub fn codes(diagnostics: &[recipe_graph::Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.code.as_str()).collect()
}

/// Install a test subscriber once; `RUST_LOG=recipe_graph=debug` shows spans.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
