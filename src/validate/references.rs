//! Template reference rules (W002–W004).
//!
//! Every `{{...}}` in a node's string config is checked. Input variables are
//! owned by the declared input schema and are not cross-checked here. Step
//! references must name a current step id, and that step must be able to run
//! before the referencing node along some chain of edges.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::error::Diagnostic;
use crate::lower::reference::{TemplateRef, scan};
use crate::parse::graph::RecipeDigraph;
use crate::parse::types::{RecipeGraph, RecipeNode};

pub fn validate_references(graph: &RecipeGraph, digraph: &RecipeDigraph) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    // A step id can belong to several nodes while duplicates are unresolved.
    let mut by_step_id: HashMap<&str, Vec<NodeIndex>> = HashMap::new();
    for (i, node) in graph.nodes.iter().enumerate() {
        by_step_id
            .entry(node.data.step_id.as_str())
            .or_default()
            .push(NodeIndex::new(i));
    }

    for (i, node) in graph.nodes.iter().enumerate() {
        let here = NodeIndex::new(i);
        for field in node.data.config.text_fields() {
            for reference in scan(field.value) {
                check_reference(node, here, &reference, &by_step_id, digraph, &mut out);
            }
        }
    }

    out
}

fn check_reference(
    node: &RecipeNode,
    here: NodeIndex,
    reference: &TemplateRef<'_>,
    by_step_id: &HashMap<&str, Vec<NodeIndex>>,
    digraph: &RecipeDigraph,
    out: &mut Vec<Diagnostic>,
) {
    match reference {
        TemplateRef::Input { .. } => {}
        TemplateRef::Malformed { raw } => out.push(Diagnostic::warning(
            "W003",
            format!(
                "Invalid variable reference \"{}\" in node \"{}\": \
                 step references must look like steps.<id>.output.",
                raw, node.data.name
            ),
            Some(node.id.clone()),
        )),
        TemplateRef::StepOutput { step_id, raw } => match by_step_id.get(step_id) {
            None => out.push(Diagnostic::warning(
                "W002",
                format!(
                    "Invalid variable reference \"{}\" in node \"{}\": no step \"{}\" exists.",
                    raw, node.data.name, step_id
                ),
                Some(node.id.clone()),
            )),
            Some(candidates) => {
                let upstream = candidates
                    .iter()
                    .any(|&source| source != here && digraph.has_path(source, here));
                if !upstream {
                    out.push(Diagnostic::warning(
                        "W004",
                        format!(
                            "Reference \"{}\" in node \"{}\" is unreachable: \
                             no edge path runs from step \"{}\" to this node.",
                            raw, node.data.name, step_id
                        ),
                        Some(node.id.clone()),
                    ));
                }
            }
        },
    }
}
