//! Linear-form recipe types: the ordered step list the execution engine runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::types::{RecipeMetadata, StepConfig, StepType};
use crate::error::ModelError;

/// One unit of work. On the wire: `{id, name, type, ...config fields}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawStep")]
pub struct Step {
    pub id: String,
    pub name: String,
    pub config: StepConfig,
}

impl Step {
    pub fn new(id: impl Into<String>, name: impl Into<String>, config: StepConfig) -> Self {
        Step {
            id: id.into(),
            name: name.into(),
            config,
        }
    }

    pub fn step_type(&self) -> StepType {
        self.config.step_type()
    }
}

#[derive(Deserialize)]
struct RawStep {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    step_type: StepType,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl TryFrom<RawStep> for Step {
    type Error = ModelError;

    fn try_from(raw: RawStep) -> Result<Self, Self::Error> {
        Ok(Step {
            id: raw.id,
            name: raw.name,
            config: StepConfig::from_value(raw.step_type, Value::Object(raw.rest))?,
        })
    }
}

#[derive(Serialize)]
struct StepRef<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    step_type: StepType,
    #[serde(flatten)]
    config: &'a StepConfig,
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StepRef {
            id: &self.id,
            name: &self.name,
            step_type: self.step_type(),
            config: &self.config,
        }
        .serialize(serializer)
    }
}

/// Ordered steps plus metadata, as produced by linearizing a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub steps: Vec<Step>,
    pub metadata: RecipeMetadata,
}

/// A complete recipe as stored by the backend.
///
/// Every field has a default so that a recipe missing required fields still
/// parses and the recipe validator can report what is absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearRecipe {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost_per_run: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi_metrics: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub input_schema: Value,
    #[serde(default)]
    pub output_schema: Value,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl LinearRecipe {
    pub fn metadata(&self) -> RecipeMetadata {
        let schema_or_empty = |v: &Value| match v {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };
        RecipeMetadata {
            name: self.name.clone(),
            description: self.description.clone(),
            category: if self.category.is_empty() {
                RecipeMetadata::default().category
            } else {
                self.category.clone()
            },
            input_schema: schema_or_empty(&self.input_schema),
            output_schema: schema_or_empty(&self.output_schema),
        }
    }

    /// Replace steps and metadata with an edited draft. Slug, version, icon,
    /// cost and ROI figures are kept.
    pub fn apply_draft(&mut self, draft: RecipeDraft) {
        self.steps = draft.steps;
        self.name = draft.metadata.name;
        self.description = draft.metadata.description;
        self.category = draft.metadata.category;
        self.input_schema = draft.metadata.input_schema;
        self.output_schema = draft.metadata.output_schema;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn step_flattens_config_fields() {
        let value = json!({
            "id": "summarize",
            "name": "Summarize",
            "type": "llm_call",
            "system_prompt": "You summarize.",
            "user_prompt": "{{steps.fetch.output.text}}",
            "complexity": "generate_short"
        });
        let step: Step = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(step.step_type(), StepType::LlmCall);
        assert_eq!(serde_json::to_value(&step).unwrap(), value);
    }

    #[test]
    fn step_requires_known_type() {
        let value = json!({ "id": "x", "name": "X", "type": "webhook" });
        let result = serde_json::from_value::<Step>(value);
        assert!(result.is_err());
    }

    #[test]
    fn apply_draft_keeps_identity() {
        let mut recipe = LinearRecipe {
            slug: "ticket-triage".into(),
            version: "1.2.0".into(),
            name: "Old".into(),
            ..Default::default()
        };
        recipe.apply_draft(RecipeDraft {
            steps: vec![Step::new("a", "A", StepConfig::default_for(StepType::Audio))],
            metadata: RecipeMetadata {
                name: "New".into(),
                ..Default::default()
            },
        });
        assert_eq!(recipe.slug, "ticket-triage");
        assert_eq!(recipe.version, "1.2.0");
        assert_eq!(recipe.name, "New");
        assert_eq!(recipe.steps.len(), 1);
    }
}
