//! Editor and layout configuration supplied by the host.

use serde::{Deserialize, Serialize};

use crate::error::Diagnostic;
use crate::parse::types::{DEFAULT_EDGE_TYPE, Position};

/// Single-column layout used when a linear recipe is opened as a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub x: f64,
    pub vertical_spacing: f64,
    pub base_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            x: 100.0,
            vertical_spacing: 150.0,
            base_offset: 100.0,
        }
    }
}

impl LayoutConfig {
    pub fn position(&self, index: usize) -> Position {
        Position::new(self.x, index as f64 * self.vertical_spacing + self.base_offset)
    }
}

/// Box in which freshly added nodes are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnArea {
    pub origin: Position,
    pub width: f64,
    pub height: f64,
}

impl Default for SpawnArea {
    fn default() -> Self {
        SpawnArea {
            origin: Position::new(100.0, 100.0),
            width: 400.0,
            height: 400.0,
        }
    }
}

impl SpawnArea {
    pub fn contains(&self, p: &Position) -> bool {
        p.x >= self.origin.x
            && p.x <= self.origin.x + self.width
            && p.y >= self.origin.y
            && p.y <= self.origin.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub layout: LayoutConfig,
    pub spawn_area: SpawnArea,
    /// Renderer edge style written on new edges.
    pub edge_type: String,
    /// Fixed seed for node placement; random when absent.
    pub seed: Option<u64>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            layout: LayoutConfig::default(),
            spawn_area: SpawnArea::default(),
            edge_type: DEFAULT_EDGE_TYPE.to_string(),
            seed: None,
        }
    }
}

impl EditorConfig {
    /// Parse a host-supplied config object. An empty string yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, Vec<Diagnostic>> {
        if json.trim().is_empty() {
            return Ok(EditorConfig::default());
        }
        serde_json::from_str(json).map_err(|e| {
            vec![Diagnostic::parse(
                "P001",
                format!("Failed to parse editor config JSON: {}", e),
            )]
        })
    }
}
