//! Linear recipe rules (R001–R005, R101–R104) and authoring suggestions.
//!
//! An empty step list is reported once, by R003.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::Diagnostic;
use crate::parse::step::LinearRecipe;
use crate::parse::types::StepConfig;

pub fn validate_recipe_rules(recipe: &LinearRecipe) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    r001_required_fields(recipe, &mut out);
    r002_slug_format(recipe, &mut out);
    r003_has_steps(recipe, &mut out);
    r004_r005_step_ids(recipe, &mut out);
    r101_r102_llm_hints(recipe, &mut out);
    r103_r104_schema_types(recipe, &mut out);

    out
}

fn r001_required_fields(recipe: &LinearRecipe, out: &mut Vec<Diagnostic>) {
    let missing = [
        ("slug", recipe.slug.trim().is_empty()),
        ("name", recipe.name.trim().is_empty()),
        ("category", recipe.category.trim().is_empty()),
        ("input_schema", recipe.input_schema.is_null()),
        ("output_schema", recipe.output_schema.is_null()),
    ];
    for (field, absent) in missing {
        if absent {
            out.push(Diagnostic::error(
                "R001",
                format!("Missing required field: {}", field),
                None,
            ));
        }
    }
}

/// Kebab-case: lowercase ASCII letters, digits and dashes.
pub fn is_kebab_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

fn r002_slug_format(recipe: &LinearRecipe, out: &mut Vec<Diagnostic>) {
    if !recipe.slug.is_empty() && !is_kebab_slug(&recipe.slug) {
        out.push(Diagnostic::error(
            "R002",
            "Slug must be kebab-case (lowercase letters, digits and dashes)",
            None,
        ));
    }
}

fn r003_has_steps(recipe: &LinearRecipe, out: &mut Vec<Diagnostic>) {
    if recipe.steps.is_empty() {
        out.push(Diagnostic::error("R003", "Recipe must have at least one step", None));
    }
}

fn r004_r005_step_ids(recipe: &LinearRecipe, out: &mut Vec<Diagnostic>) {
    let mut seen = HashSet::new();
    for (i, step) in recipe.steps.iter().enumerate() {
        if step.id.trim().is_empty() {
            out.push(Diagnostic::error("R004", format!("Step {}: missing 'id'", i), None));
            continue;
        }
        if !seen.insert(step.id.as_str()) {
            out.push(Diagnostic::error(
                "R005",
                format!("Step {}: duplicate id '{}'", i, step.id),
                Some(step.id.clone()),
            ));
        }
    }
}

fn r101_r102_llm_hints(recipe: &LinearRecipe, out: &mut Vec<Diagnostic>) {
    for (i, step) in recipe.steps.iter().enumerate() {
        let StepConfig::LlmCall(config) = &step.config else {
            continue;
        };
        let label = if step.id.is_empty() { i.to_string() } else { step.id.clone() };
        if config.system_prompt.is_none() {
            out.push(Diagnostic::warning(
                "R101",
                format!("Step {}: 'system_prompt' is recommended for llm_call", label),
                Some(step.id.clone()),
            ));
        }
        if config.complexity.is_none() {
            out.push(Diagnostic::warning(
                "R102",
                format!("Step {}: 'complexity' is recommended for model routing", label),
                Some(step.id.clone()),
            ));
        }
    }
}

fn schema_is_object(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("object")
}

fn r103_r104_schema_types(recipe: &LinearRecipe, out: &mut Vec<Diagnostic>) {
    if !recipe.input_schema.is_null() && !schema_is_object(&recipe.input_schema) {
        out.push(Diagnostic::warning(
            "R103",
            "input_schema should be of type 'object'",
            None,
        ));
    }
    if !recipe.output_schema.is_null() && !schema_is_object(&recipe.output_schema) {
        out.push(Diagnostic::warning(
            "R104",
            "output_schema should be of type 'object'",
            None,
        ));
    }
}

pub fn suggestions(recipe: &LinearRecipe) -> Vec<String> {
    let mut out = Vec::new();
    if recipe.estimated_cost_per_run.is_none() {
        out.push("Add 'estimated_cost_per_run' to help users anticipate costs".to_string());
    }
    if recipe.roi_metrics.is_none() {
        out.push("Add 'roi_metrics' to show the business value".to_string());
    }
    out
}
