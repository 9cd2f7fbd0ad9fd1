//! petgraph-based dependency view of a recipe graph.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use super::types::RecipeGraph;

pub struct RecipeDigraph {
    /// Node weights are node ids, edge weights are positions in
    /// `RecipeGraph::edges`. Node indices follow node-array order.
    pub graph: DiGraph<String, usize>,
    pub node_indices: HashMap<String, NodeIndex>,
    /// Positions in `RecipeGraph::edges` of edges with an unknown endpoint.
    pub dangling: Vec<usize>,
}

impl RecipeDigraph {
    /// Build the view. Edges whose source or target is not a node are left
    /// out of the topology and recorded in `dangling`.
    pub fn build(recipe: &RecipeGraph) -> Self {
        let mut graph = DiGraph::with_capacity(recipe.nodes.len(), recipe.edges.len());
        let mut node_indices = HashMap::with_capacity(recipe.nodes.len());
        let mut dangling = Vec::new();

        for node in &recipe.nodes {
            let idx = graph.add_node(node.id.clone());
            // First occurrence wins; duplicates are reported by the validator.
            node_indices.entry(node.id.clone()).or_insert(idx);
        }

        for (pos, edge) in recipe.edges.iter().enumerate() {
            match (node_indices.get(&edge.source), node_indices.get(&edge.target)) {
                (Some(&s), Some(&t)) => {
                    graph.add_edge(s, t, pos);
                }
                _ => dangling.push(pos),
            }
        }

        RecipeDigraph {
            graph,
            node_indices,
            dangling,
        }
    }

    pub fn index_of(&self, node_id: &str) -> Option<NodeIndex> {
        self.node_indices.get(node_id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Successors of `idx`, one entry per edge, in edge insertion order.
    pub fn successors_of(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .collect();
        out.sort_by_key(|(edge, _)| *edge);
        out.into_iter().map(|(_, target)| target).collect()
    }

    /// Number of incoming edges, parallel edges and self-loops included.
    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        let Some(idx) = self.index_of(node_id) else {
            return vec![];
        };
        self.successors_of(idx)
            .into_iter()
            .map(|n| self.graph[n].as_str())
            .collect()
    }

    pub fn incoming_count(&self, node_id: &str) -> usize {
        self.index_of(node_id).map_or(0, |idx| self.in_degree(idx))
    }

    pub fn outgoing_count(&self, node_id: &str) -> usize {
        self.index_of(node_id).map_or(0, |idx| {
            self.graph.edges_directed(idx, Direction::Outgoing).count()
        })
    }

    /// True when a non-empty chain of edges leads from `from` to `to`.
    pub fn has_path(&self, from: NodeIndex, to: NodeIndex) -> bool {
        if from == to {
            return self
                .successors_of(from)
                .into_iter()
                .any(|next| next == to || has_path_connecting(&self.graph, next, to, None));
        }
        has_path_connecting(&self.graph, from, to, None)
    }
}
