//! Parse phase: JSON → recipe types, plus the graph model itself.

pub mod graph;
pub mod step;
pub mod types;

pub use graph::RecipeDigraph;
pub use step::*;
pub use types::*;

use crate::error::Diagnostic;

/// Deserialize a linear recipe JSON string.
pub fn parse_recipe(json: &str) -> Result<LinearRecipe, Vec<Diagnostic>> {
    serde_json::from_str::<LinearRecipe>(json).map_err(|e| {
        vec![Diagnostic::parse(
            "P001",
            format!("Failed to parse recipe JSON: {}", e),
        )]
    })
}

/// Deserialize a visual graph JSON string.
pub fn parse_graph(json: &str) -> Result<RecipeGraph, Vec<Diagnostic>> {
    serde_json::from_str::<RecipeGraph>(json).map_err(|e| {
        vec![Diagnostic::parse(
            "P001",
            format!("Failed to parse graph JSON: {}", e),
        )]
    })
}
