//! Linear → graph: lay a step list out as a single-column chain.

use crate::config::LayoutConfig;
use crate::parse::step::{LinearRecipe, Step};
use crate::parse::types::*;

pub fn node_id_for(step_id: &str) -> String {
    format!("node-{}", step_id)
}

pub fn edge_id_for(source: &str, target: &str) -> String {
    format!("edge-{}-{}", source, target)
}

/// Open a linear recipe as a chain graph.
pub fn linear_to_graph(recipe: &LinearRecipe, layout: &LayoutConfig) -> RecipeGraph {
    steps_to_graph(&recipe.steps, recipe.metadata(), layout)
}

/// One node per step in input order, one edge per consecutive pair.
pub fn steps_to_graph(
    steps: &[Step],
    metadata: RecipeMetadata,
    layout: &LayoutConfig,
) -> RecipeGraph {
    let nodes: Vec<RecipeNode> = steps
        .iter()
        .enumerate()
        .map(|(index, step)| RecipeNode {
            id: node_id_for(&step.id),
            position: layout.position(index),
            data: NodeData {
                step_id: step.id.clone(),
                name: step.name.clone(),
                config: step.config.clone(),
            },
        })
        .collect();

    let edges: Vec<RecipeEdge> = nodes
        .windows(2)
        .map(|pair| RecipeEdge {
            id: edge_id_for(&pair[0].id, &pair[1].id),
            source: pair[0].id.clone(),
            target: pair[1].id.clone(),
            kind: DEFAULT_EDGE_TYPE.to_string(),
        })
        .collect();

    tracing::debug!(nodes = nodes.len(), edges = edges.len(), "laid out recipe as chain graph");

    RecipeGraph {
        nodes,
        edges,
        metadata,
    }
}
