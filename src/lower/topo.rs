//! Deterministic topological sort (Kahn's algorithm).

use std::collections::VecDeque;

use petgraph::graph::NodeIndex;

use crate::error::CycleError;
use crate::parse::graph::RecipeDigraph;

/// Node indices in execution order.
///
/// Ready nodes are taken in node-array order and successors are released in
/// edge insertion order, so an unchanged graph always yields the same order.
/// Any node left unordered sits on or behind a cycle; no partial order is
/// returned in that case.
pub fn topo_sort(digraph: &RecipeDigraph) -> Result<Vec<NodeIndex>, CycleError> {
    let count = digraph.node_count();
    let mut in_degree: Vec<usize> = (0..count)
        .map(|i| digraph.in_degree(NodeIndex::new(i)))
        .collect();

    let mut queue: VecDeque<NodeIndex> = (0..count)
        .filter(|&i| in_degree[i] == 0)
        .map(NodeIndex::new)
        .collect();

    let mut order = Vec::with_capacity(count);
    while let Some(idx) = queue.pop_front() {
        order.push(idx);
        for next in digraph.successors_of(idx) {
            let degree = &mut in_degree[next.index()];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(next);
            }
        }
    }

    if order.len() < count {
        let nodes: Vec<String> = (0..count)
            .filter(|&i| in_degree[i] > 0)
            .map(|i| digraph.graph[NodeIndex::new(i)].clone())
            .collect();
        tracing::warn!(unordered = nodes.len(), "cycle blocks topological order");
        return Err(CycleError { nodes });
    }

    Ok(order)
}
