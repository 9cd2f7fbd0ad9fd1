//! WASM entry points for the browser editor.

use wasm_bindgen::prelude::*;

use crate::config::EditorConfig;
use crate::error::Diagnostic;
use crate::parse::step::RecipeDraft;
use crate::parse::types::{RecipeGraph, RecipeMetadata, StepType};
use crate::session::{EditorSession, NodePatch};
use crate::validate::ValidationReport;

/// Open a linear recipe JSON as a visual graph.
/// Returns `{status: "graph", graph}` or `{status: "errors", errors}`.
#[wasm_bindgen]
pub fn recipe_to_visual(recipe_json: &str, config_json: &str) -> JsValue {
    to_js(&recipe_to_visual_inner(recipe_json, config_json))
}

fn recipe_to_visual_inner(recipe_json: &str, config_json: &str) -> ConvertResult {
    let config = match EditorConfig::from_json(config_json) {
        Ok(c) => c,
        Err(errors) => return ConvertResult::errors(errors),
    };
    match crate::parse::parse_recipe(recipe_json) {
        Ok(recipe) => ConvertResult::Graph {
            graph: crate::lower::linear_to_graph(&recipe, &config.layout),
        },
        Err(errors) => ConvertResult::errors(errors),
    }
}

/// Linearize a visual graph JSON. A cyclic graph yields errors, never a partial order.
#[wasm_bindgen]
pub fn visual_to_recipe(graph_json: &str) -> JsValue {
    to_js(&visual_to_recipe_inner(graph_json))
}

fn visual_to_recipe_inner(graph_json: &str) -> ConvertResult {
    let graph = match crate::parse::parse_graph(graph_json) {
        Ok(g) => g,
        Err(errors) => return ConvertResult::errors(errors),
    };
    match crate::lower::graph_to_recipe(&graph) {
        Ok(recipe) => ConvertResult::Recipe { recipe },
        Err(cycle) => ConvertResult::errors(vec![Diagnostic::from(cycle)]),
    }
}

/// Validate a visual graph JSON. Returns a `ValidationReport`.
#[wasm_bindgen]
pub fn validate_visual_recipe(graph_json: &str) -> JsValue {
    let report = match crate::parse::parse_graph(graph_json) {
        Ok(graph) => crate::validate::validate_graph(&graph),
        Err(errors) => ValidationReport::from_diagnostics(errors),
    };
    to_js(&ReportDto::from(report))
}

/// Validate a linear recipe JSON. Returns a `ValidationReport` with suggestions.
#[wasm_bindgen]
pub fn validate_linear_recipe(recipe_json: &str) -> JsValue {
    let report = match crate::parse::parse_recipe(recipe_json) {
        Ok(recipe) => crate::validate::validate_recipe(&recipe),
        Err(errors) => ValidationReport::from_diagnostics(errors),
    };
    to_js(&ReportDto::from(report))
}

// ---------------------------------------------------------------------------
// Editor session
// ---------------------------------------------------------------------------

/// Browser handle on an `EditorSession`. Every mutator returns the new graph,
/// which is the host's change notification.
#[wasm_bindgen]
pub struct RecipeEditor {
    session: EditorSession,
}

#[wasm_bindgen]
impl RecipeEditor {
    /// Open a linear recipe JSON; an empty string starts an empty session.
    #[wasm_bindgen(constructor)]
    pub fn new(recipe_json: &str, config_json: &str) -> Result<RecipeEditor, JsValue> {
        let config = EditorConfig::from_json(config_json).map_err(errors_to_js)?;
        let session = if recipe_json.trim().is_empty() {
            EditorSession::new(RecipeMetadata::default(), config)
        } else {
            let recipe = crate::parse::parse_recipe(recipe_json).map_err(errors_to_js)?;
            EditorSession::from_recipe(&recipe, config)
        };
        Ok(RecipeEditor { session })
    }

    pub fn graph(&self) -> JsValue {
        to_js(self.session.graph())
    }

    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, step_type: &str) -> Result<JsValue, JsValue> {
        let step_type = StepType::parse(step_type)
            .ok_or_else(|| JsValue::from_str(&format!("unknown step type '{}'", step_type)))?;
        self.session.add_node(step_type).map_err(session_error)?;
        Ok(self.graph())
    }

    #[wasm_bindgen(js_name = updateNode)]
    pub fn update_node(&mut self, node_id: &str, patch_json: &str) -> Result<JsValue, JsValue> {
        let patch: NodePatch = serde_json::from_str(patch_json)
            .map_err(|e| JsValue::from_str(&format!("invalid node patch: {}", e)))?;
        self.session.update_node(node_id, &patch).map_err(session_error)?;
        Ok(self.graph())
    }

    #[wasm_bindgen(js_name = deleteNode)]
    pub fn delete_node(&mut self, node_id: &str) -> Result<JsValue, JsValue> {
        self.session.delete_node(node_id).map_err(session_error)?;
        Ok(self.graph())
    }

    pub fn connect(&mut self, source: &str, target: &str) -> Result<JsValue, JsValue> {
        self.session.connect(source, target).map_err(session_error)?;
        Ok(self.graph())
    }

    pub fn disconnect(&mut self, edge_id: &str) -> Result<JsValue, JsValue> {
        self.session.disconnect(edge_id).map_err(session_error)?;
        Ok(self.graph())
    }

    #[wasm_bindgen(js_name = moveNode)]
    pub fn move_node(&mut self, node_id: &str, x: f64, y: f64) -> Result<JsValue, JsValue> {
        self.session
            .move_node(node_id, crate::parse::types::Position::new(x, y))
            .map_err(session_error)?;
        Ok(self.graph())
    }

    #[wasm_bindgen(js_name = selectNode)]
    pub fn select_node(&mut self, node_id: &str) -> Result<JsValue, JsValue> {
        self.session.select_node(node_id).map_err(session_error)?;
        Ok(to_js(&self.session.selected_node()))
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&mut self) -> Result<JsValue, JsValue> {
        self.session.delete_selected().map_err(session_error)?;
        Ok(self.graph())
    }

    pub fn validate(&self) -> JsValue {
        to_js(&ReportDto::from(self.session.validate()))
    }

    /// Validate and linearize.
    /// Returns `{status: "recipe", recipe}` or `{status: "errors", errors}`.
    pub fn save(&self) -> JsValue {
        let result = match self.session.prepare_save() {
            Ok(recipe) => ConvertResult::Recipe { recipe },
            Err(crate::error::SessionError::Invalid(report)) => {
                ConvertResult::errors(report.errors)
            }
            Err(e) => ConvertResult::Errors {
                errors: vec![ErrorDto::message(e.to_string())],
            },
        };
        to_js(&result)
    }

    pub fn discard(&mut self) {
        self.session.discard();
    }
}

/// Configs, flattened steps and schemas serialize as maps; the host reads
/// them as plain objects, never as JS `Map`s.
fn to_js<T: serde::Serialize + ?Sized>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

fn errors_to_js(errors: Vec<Diagnostic>) -> JsValue {
    let dtos: Vec<ErrorDto> = errors.into_iter().map(ErrorDto::from).collect();
    to_js(&dtos)
}

fn session_error(e: crate::error::SessionError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
struct ErrorDto {
    code: String,
    phase: String,
    message: String,
    node_id: Option<String>,
}

impl ErrorDto {
    fn message(message: String) -> Self {
        ErrorDto {
            code: "S001".into(),
            phase: "Edit".into(),
            message,
            node_id: None,
        }
    }
}

impl From<Diagnostic> for ErrorDto {
    fn from(e: Diagnostic) -> Self {
        ErrorDto {
            code: e.code,
            phase: e.phase.to_string(),
            message: e.message,
            node_id: e.node_id,
        }
    }
}

/// The `{valid, errors, warnings}` string lists the editor shows, plus the
/// structured diagnostics behind them.
#[derive(serde::Serialize)]
struct ReportDto {
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    suggestions: Vec<String>,
    diagnostics: Vec<ErrorDto>,
}

impl From<ValidationReport> for ReportDto {
    fn from(report: ValidationReport) -> Self {
        ReportDto {
            valid: report.valid,
            errors: report.error_messages().into_iter().map(String::from).collect(),
            warnings: report.warning_messages().into_iter().map(String::from).collect(),
            suggestions: report.suggestions,
            diagnostics: report
                .errors
                .into_iter()
                .chain(report.warnings)
                .map(ErrorDto::from)
                .collect(),
        }
    }
}

#[derive(serde::Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum ConvertResult {
    Graph { graph: RecipeGraph },
    Recipe { recipe: RecipeDraft },
    Errors { errors: Vec<ErrorDto> },
}

impl ConvertResult {
    fn errors(errors: Vec<Diagnostic>) -> Self {
        ConvertResult::Errors {
            errors: errors.into_iter().map(ErrorDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RECIPE: &str = r#"{
        "slug": "echo",
        "name": "Echo",
        "category": "general",
        "input_schema": { "type": "object" },
        "output_schema": { "type": "object" },
        "steps": [
            {
                "id": "say",
                "name": "Say",
                "type": "llm_call",
                "user_prompt": "{{text}}",
                "tone": "dry"
            }
        ]
    }"#;

    #[test]
    fn recipe_opens_as_tagged_graph() {
        let out = serde_json::to_value(recipe_to_visual_inner(RECIPE, "")).unwrap();
        assert_eq!(out["status"], "graph");
        let data = &out["graph"]["nodes"][0]["data"];
        assert_eq!(data["stepId"], "say");
        assert_eq!(data["stepType"], "llm_call");
        assert_eq!(data["config"], json!({ "user_prompt": "{{text}}", "tone": "dry" }));
    }

    #[test]
    fn cyclic_graph_yields_errors() {
        let graph = include_str!("../tests/fixtures/cycle_graph.json");
        let out = serde_json::to_value(visual_to_recipe_inner(graph)).unwrap();
        assert_eq!(out["status"], "errors");
        assert_eq!(out["errors"][0]["code"], "L001");
    }

    #[test]
    fn bad_config_json_is_a_parse_error() {
        let out = serde_json::to_value(recipe_to_visual_inner(RECIPE, "{ nope")).unwrap();
        assert_eq!(out["status"], "errors");
        assert_eq!(out["errors"][0]["code"], "P001");
    }
}
