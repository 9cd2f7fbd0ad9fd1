//! Compile phase: visual graph ⇄ linear step list.

pub mod layout;
pub mod reference;
pub mod topo;

pub use layout::{linear_to_graph, steps_to_graph};

use crate::error::CycleError;
use crate::parse::graph::RecipeDigraph;
use crate::parse::step::{RecipeDraft, Step};
use crate::parse::types::RecipeGraph;

/// Linearize a graph into execution order.
///
/// Each step is the node's step data; the editor node id and position are dropped.
pub fn graph_to_linear(graph: &RecipeGraph) -> Result<Vec<Step>, CycleError> {
    let digraph = RecipeDigraph::build(graph);
    let order = topo::topo_sort(&digraph)?;

    let steps = order
        .into_iter()
        .map(|idx| {
            let node = &graph.nodes[idx.index()];
            Step {
                id: node.data.step_id.clone(),
                name: node.data.name.clone(),
                config: node.data.config.clone(),
            }
        })
        .collect();

    Ok(steps)
}

/// Linearize a graph and carry its metadata along.
pub fn graph_to_recipe(graph: &RecipeGraph) -> Result<RecipeDraft, CycleError> {
    let steps = graph_to_linear(graph)?;
    tracing::debug!(steps = steps.len(), "compiled graph to linear recipe");
    Ok(RecipeDraft {
        steps,
        metadata: graph.metadata.clone(),
    })
}
