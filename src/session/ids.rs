//! Per-session id allocation.

use crate::parse::types::RecipeGraph;

/// Monotonic counter scoped to one session. A value is never handed out
/// twice, even after the node or edge that used it is deleted, and values
/// already present in the graph (e.g. from a loaded recipe) are skipped.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    counter: u64,
}

/// Ids for a new node: the editor id and the engine-facing step id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIds {
    pub node_id: String,
    pub step_id: String,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator::default()
    }

    pub fn issued(&self) -> u64 {
        self.counter
    }

    pub fn next_node(&mut self, graph: &RecipeGraph) -> NodeIds {
        loop {
            self.counter += 1;
            let node_id = format!("node-{}", self.counter);
            let step_id = format!("step_{}", self.counter);
            if !graph.contains_node(&node_id) && !graph.contains_step_id(&step_id) {
                return NodeIds { node_id, step_id };
            }
        }
    }

    pub fn next_edge(&mut self, graph: &RecipeGraph) -> String {
        loop {
            self.counter += 1;
            let edge_id = format!("edge-{}", self.counter);
            if !graph.contains_edge(&edge_id) {
                return edge_id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::types::*;

    #[test]
    fn skips_ids_already_in_graph() {
        let mut graph = RecipeGraph::default();
        graph.nodes.push(RecipeNode {
            id: "node-1".into(),
            position: Position::default(),
            data: NodeData {
                step_id: "fetch".into(),
                name: "Fetch".into(),
                config: StepConfig::default_for(StepType::LlmCall),
            },
        });
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_node(&graph).node_id, "node-2");
        assert_eq!(ids.next_edge(&graph), "edge-3");
        assert_eq!(ids.issued(), 3);
    }
}
