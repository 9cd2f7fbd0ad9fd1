//! Recipe workflow graph model.
//!
//! Converts between the linear step list an execution engine runs and the
//! node/edge graph a visual editor manipulates, and validates edited graphs
//! before they are saved.

pub mod config;
pub mod error;
pub mod lower;
pub mod parse;
pub mod session;
pub mod validate;
pub mod wasm;

pub use config::{EditorConfig, LayoutConfig, SpawnArea};
pub use error::{CycleError, Diagnostic, ModelError, SessionError};
pub use lower::{graph_to_linear, graph_to_recipe, linear_to_graph};
pub use parse::{LinearRecipe, RecipeDraft, RecipeGraph, Step, StepConfig, StepType};
pub use session::{EditorSession, NodePatch, SessionStatus};
pub use validate::{ValidationReport, validate_graph, validate_recipe};
