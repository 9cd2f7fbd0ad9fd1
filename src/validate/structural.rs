//! Graph-level structural rules (V001–V005, W001, W005).

use std::collections::{HashMap, HashSet};

use crate::error::{CYCLE_MESSAGE, Diagnostic};
use crate::lower::topo::topo_sort;
use crate::parse::graph::RecipeDigraph;
use crate::parse::types::RecipeGraph;

/// Cycle, completeness and orphan rules.
pub fn validate_structural(graph: &RecipeGraph, digraph: &RecipeDigraph) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    v001_no_cycles(digraph, &mut out);
    v002_v003_names_and_step_ids(graph, &mut out);
    v004_unique_step_ids(graph, &mut out);
    v005_unique_node_ids(graph, &mut out);
    w001_no_orphans(graph, &mut out);

    out
}

fn v001_no_cycles(digraph: &RecipeDigraph, out: &mut Vec<Diagnostic>) {
    if topo_sort(digraph).is_err() {
        out.push(Diagnostic::error("V001", CYCLE_MESSAGE, None));
    }
}

fn v002_v003_names_and_step_ids(graph: &RecipeGraph, out: &mut Vec<Diagnostic>) {
    for node in &graph.nodes {
        if node.data.name.trim().is_empty() {
            out.push(Diagnostic::error(
                "V002",
                format!("Node \"{}\" has no name.", node.id),
                Some(node.id.clone()),
            ));
        }
        if node.data.step_id.trim().is_empty() {
            out.push(Diagnostic::error(
                "V003",
                format!("Node \"{}\" has no step ID.", node.id),
                Some(node.id.clone()),
            ));
        }
    }
}

fn v004_unique_step_ids(graph: &RecipeGraph, out: &mut Vec<Diagnostic>) {
    let mut first_seen: HashMap<&str, &str> = HashMap::new();
    for node in &graph.nodes {
        let step_id = node.data.step_id.as_str();
        if step_id.trim().is_empty() {
            continue;
        }
        if let Some(first) = first_seen.get(step_id) {
            out.push(Diagnostic::error(
                "V004",
                format!(
                    "Step ID \"{}\" of node \"{}\" is already used by node \"{}\".",
                    step_id, node.id, first
                ),
                Some(node.id.clone()),
            ));
        } else {
            first_seen.insert(step_id, node.id.as_str());
        }
    }
}

fn v005_unique_node_ids(graph: &RecipeGraph, out: &mut Vec<Diagnostic>) {
    let mut seen = HashSet::new();
    for node in &graph.nodes {
        if !seen.insert(node.id.as_str()) {
            out.push(Diagnostic::error(
                "V005",
                format!("Duplicate node ID \"{}\".", node.id),
                Some(node.id.clone()),
            ));
        }
    }
}

fn w001_no_orphans(graph: &RecipeGraph, out: &mut Vec<Diagnostic>) {
    if graph.nodes.len() <= 1 {
        return;
    }
    let connected: HashSet<&str> = graph
        .edges
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .collect();

    for node in &graph.nodes {
        if !connected.contains(node.id.as_str()) {
            out.push(Diagnostic::warning(
                "W001",
                format!("Node \"{}\" is not connected to the workflow.", node.data.name),
                Some(node.id.clone()),
            ));
        }
    }
}

/// Edges pointing at a node id that does not exist (W005).
pub fn dangling_edges(graph: &RecipeGraph, digraph: &RecipeDigraph) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for &pos in &digraph.dangling {
        let edge = &graph.edges[pos];
        for endpoint in [&edge.source, &edge.target] {
            if digraph.index_of(endpoint).is_none() {
                out.push(Diagnostic::warning(
                    "W005",
                    format!("Edge \"{}\" references unknown node \"{}\".", edge.id, endpoint),
                    None,
                ));
            }
        }
    }
    out
}
