//! Editor session: the mutable graph behind the node editor.
//!
//! The graph lives behind an `Arc` and every mutation goes through
//! `Arc::make_mut`, so a snapshot taken with [`EditorSession::snapshot`]
//! never changes underneath its reader. Each successful mutator is one
//! atomic transition and notifies the change listener synchronously.

pub mod ids;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::EditorConfig;
use crate::error::{CycleError, SessionError};
use crate::lower::{graph_to_recipe, linear_to_graph};
use crate::parse::step::{LinearRecipe, RecipeDraft};
use crate::parse::types::*;
use crate::validate::{ValidationReport, validate_graph};
use ids::IdAllocator;

/// Called with the new graph after every successful mutation.
pub type ChangeListener = Box<dyn FnMut(&Arc<RecipeGraph>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Empty,
    Editing,
    Discarded,
}

/// Partial node update. `config` is merged key by key into the current
/// config; the other fields replace. Changing `stepType` resets the config
/// to that kind's defaults before the merge.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default)]
    pub step_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub step_type: Option<StepType>,
    #[serde(default)]
    pub config: Option<Map<String, Value>>,
}

impl NodePatch {
    pub fn name(name: impl Into<String>) -> Self {
        NodePatch {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn config(config: Map<String, Value>) -> Self {
        NodePatch {
            config: Some(config),
            ..Default::default()
        }
    }

    fn apply(&self, data: &mut NodeData) -> Result<(), SessionError> {
        if let Some(step_id) = &self.step_id {
            data.step_id = step_id.clone();
        }
        if let Some(name) = &self.name {
            data.name = name.clone();
        }
        if let Some(step_type) = self.step_type {
            if step_type != data.step_type() {
                data.config = StepConfig::default_for(step_type);
            }
        }
        if let Some(config) = &self.config {
            data.config.merge(config)?;
        }
        Ok(())
    }
}

pub struct EditorSession {
    graph: Arc<RecipeGraph>,
    selected: Option<RecipeNode>,
    status: SessionStatus,
    ids: IdAllocator,
    rng: StdRng,
    config: EditorConfig,
    listener: Option<ChangeListener>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("status", &self.status)
            .field("nodes", &self.graph.nodes.len())
            .field("edges", &self.graph.edges.len())
            .field("selected", &self.selected.as_ref().map(|n| n.id.as_str()))
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// A session with no nodes yet.
    pub fn new(metadata: RecipeMetadata, config: EditorConfig) -> Self {
        Self::with_state(RecipeGraph::new(metadata), SessionStatus::Empty, config)
    }

    /// Open an existing graph for editing.
    pub fn from_graph(graph: RecipeGraph, config: EditorConfig) -> Self {
        Self::with_state(graph, SessionStatus::Editing, config)
    }

    /// Open a linear recipe, laid out as a chain graph.
    pub fn from_recipe(recipe: &LinearRecipe, config: EditorConfig) -> Self {
        let graph = linear_to_graph(recipe, &config.layout);
        Self::from_graph(graph, config)
    }

    fn with_state(graph: RecipeGraph, status: SessionStatus, config: EditorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        debug!(?status, nodes = graph.nodes.len(), "opened editor session");
        EditorSession {
            graph: Arc::new(graph),
            selected: None,
            status,
            ids: IdAllocator::new(),
            rng,
            config,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: impl FnMut(&Arc<RecipeGraph>) + 'static) -> Self {
        self.set_listener(listener);
        self
    }

    pub fn set_listener(&mut self, listener: impl FnMut(&Arc<RecipeGraph>) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn graph(&self) -> &RecipeGraph {
        &self.graph
    }

    /// An immutable view of the current graph, unaffected by later edits.
    pub fn snapshot(&self) -> Arc<RecipeGraph> {
        Arc::clone(&self.graph)
    }

    pub fn selected_node(&self) -> Option<&RecipeNode> {
        self.selected.as_ref()
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Add a node of `step_type` with default config at a random spot inside
    /// the spawn area. Returns the new node id.
    pub fn add_node(&mut self, step_type: StepType) -> Result<String, SessionError> {
        self.ensure_open()?;

        let ids = self.ids.next_node(&self.graph);
        let position = self.spawn_position();
        let node = RecipeNode {
            id: ids.node_id.clone(),
            position,
            data: NodeData {
                step_id: ids.step_id,
                name: format!("New {}", step_type),
                config: StepConfig::default_for(step_type),
            },
        };

        Arc::make_mut(&mut self.graph).nodes.push(node);
        debug!(node_id = %ids.node_id, %step_type, "added node");
        self.commit();
        Ok(ids.node_id)
    }

    pub fn update_node(&mut self, node_id: &str, patch: &NodePatch) -> Result<(), SessionError> {
        self.ensure_open()?;

        let mut data = self.require_node(node_id)?.data.clone();
        patch.apply(&mut data)?;

        let graph = Arc::make_mut(&mut self.graph);
        let Some(node) = graph.node_mut(node_id) else {
            return Err(SessionError::NodeNotFound(node_id.to_string()));
        };
        node.data = data;
        let updated = node.clone();
        self.refresh_selection(updated);

        debug!(node_id, "updated node");
        self.commit();
        Ok(())
    }

    /// Remove a node and every edge that touches it.
    pub fn delete_node(&mut self, node_id: &str) -> Result<RecipeNode, SessionError> {
        self.ensure_open()?;

        let Some(pos) = self.graph.nodes.iter().position(|n| n.id == node_id) else {
            return Err(SessionError::NodeNotFound(node_id.to_string()));
        };

        let graph = Arc::make_mut(&mut self.graph);
        let removed = graph.nodes.remove(pos);
        let before = graph.edges.len();
        graph.edges.retain(|e| !e.touches(node_id));
        let dropped_edges = before - graph.edges.len();

        if self.selected.as_ref().is_some_and(|n| n.id == node_id) {
            self.selected = None;
        }

        debug!(node_id, dropped_edges, "deleted node");
        self.commit();
        Ok(removed)
    }

    /// Add an edge `source → target`. Self-loops and duplicate edges are
    /// accepted and left for the validator to report.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<String, SessionError> {
        self.ensure_open()?;
        self.require_node(source)?;
        self.require_node(target)?;

        let edge_id = self.ids.next_edge(&self.graph);
        let edge = RecipeEdge {
            id: edge_id.clone(),
            source: source.to_string(),
            target: target.to_string(),
            kind: self.config.edge_type.clone(),
        };
        Arc::make_mut(&mut self.graph).edges.push(edge);

        debug!(%edge_id, source, target, "connected nodes");
        self.commit();
        Ok(edge_id)
    }

    pub fn disconnect(&mut self, edge_id: &str) -> Result<RecipeEdge, SessionError> {
        self.ensure_open()?;

        let Some(pos) = self.graph.edges.iter().position(|e| e.id == edge_id) else {
            return Err(SessionError::EdgeNotFound(edge_id.to_string()));
        };
        let removed = Arc::make_mut(&mut self.graph).edges.remove(pos);

        debug!(edge_id, "removed edge");
        self.commit();
        Ok(removed)
    }

    /// Position changes only affect rendering, never execution order.
    pub fn move_node(&mut self, node_id: &str, position: Position) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.require_node(node_id)?;

        let graph = Arc::make_mut(&mut self.graph);
        let Some(node) = graph.node_mut(node_id) else {
            return Err(SessionError::NodeNotFound(node_id.to_string()));
        };
        node.position = position;
        let moved = node.clone();
        self.refresh_selection(moved);

        self.commit();
        Ok(())
    }

    /// Delete whatever node is selected, if any.
    pub fn delete_selected(&mut self) -> Result<Option<RecipeNode>, SessionError> {
        self.ensure_open()?;
        match self.selected.as_ref().map(|n| n.id.clone()) {
            Some(id) => self.delete_node(&id).map(Some),
            None => Ok(None),
        }
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    pub fn select_node(&mut self, node_id: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        let node = self.require_node(node_id)?.clone();
        self.selected = Some(node);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // -------------------------------------------------------------------------
    // Read paths
    // -------------------------------------------------------------------------

    pub fn validate(&self) -> ValidationReport {
        validate_graph(&self.graph)
    }

    pub fn compile(&self) -> Result<RecipeDraft, CycleError> {
        graph_to_recipe(&self.graph)
    }

    /// Validate, then compile. Only a graph without errors is compiled.
    pub fn prepare_save(&self) -> Result<RecipeDraft, SessionError> {
        self.ensure_open()?;
        let report = self.validate();
        if !report.valid {
            return Err(SessionError::Invalid(Box::new(report)));
        }
        Ok(self.compile()?)
    }

    /// Abandon the session. Every later mutation fails with `Discarded`.
    pub fn discard(&mut self) {
        self.status = SessionStatus::Discarded;
        self.selected = None;
        self.listener = None;
        debug!("discarded editor session");
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn ensure_open(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Discarded => Err(SessionError::Discarded),
            _ => Ok(()),
        }
    }

    fn require_node(&self, node_id: &str) -> Result<&RecipeNode, SessionError> {
        self.graph
            .node(node_id)
            .ok_or_else(|| SessionError::NodeNotFound(node_id.to_string()))
    }

    fn refresh_selection(&mut self, node: RecipeNode) {
        if self.selected.as_ref().is_some_and(|n| n.id == node.id) {
            self.selected = Some(node);
        }
    }

    fn spawn_position(&mut self) -> Position {
        let area = &self.config.spawn_area;
        let x = area.origin.x + self.rng.random::<f64>() * area.width;
        let y = area.origin.y + self.rng.random::<f64>() * area.height;
        Position::new(x, y)
    }

    fn commit(&mut self) {
        if self.status == SessionStatus::Empty {
            self.status = SessionStatus::Editing;
        }
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.graph);
        }
    }
}
