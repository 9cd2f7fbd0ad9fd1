//! Validation phase.
//!
//! Checks never mutate and never short-circuit: every finding is collected.
//! Errors block a save, warnings are advisory.

pub mod recipe_rules;
pub mod references;
pub mod structural;

use serde::Serialize;

use crate::error::Diagnostic;
use crate::parse::graph::RecipeDigraph;
use crate::parse::step::LinearRecipe;
use crate::parse::types::RecipeGraph;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ValidationReport {
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            diagnostics.into_iter().partition(Diagnostic::is_error);
        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
            suggestions: Vec::new(),
        }
    }

    pub fn error_messages(&self) -> Vec<&str> {
        self.errors.iter().map(|d| d.message.as_str()).collect()
    }

    pub fn warning_messages(&self) -> Vec<&str> {
        self.warnings.iter().map(|d| d.message.as_str()).collect()
    }
}

/// Validate a visual graph: cycles, node completeness, orphans, template
/// references, dangling edges, in that order.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(nodes = graph.nodes.len(), edges = graph.edges.len())
)]
pub fn validate_graph(graph: &RecipeGraph) -> ValidationReport {
    let digraph = RecipeDigraph::build(graph);

    let mut diagnostics = structural::validate_structural(graph, &digraph);
    diagnostics.extend(references::validate_references(graph, &digraph));
    diagnostics.extend(structural::dangling_edges(graph, &digraph));

    let report = ValidationReport::from_diagnostics(diagnostics);
    tracing::debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validated graph"
    );
    report
}

/// Validate a linear recipe before it is accepted for storage.
pub fn validate_recipe(recipe: &LinearRecipe) -> ValidationReport {
    let diagnostics = recipe_rules::validate_recipe_rules(recipe);
    let mut report = ValidationReport::from_diagnostics(diagnostics);
    report.suggestions = recipe_rules::suggestions(recipe);
    report
}
