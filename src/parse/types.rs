//! Graph-form recipe types: the JSON the node editor reads and writes.
//!
//! A node wraps one workflow step. Its configuration is a tagged union keyed
//! by [`StepType`], so a node can never carry the config shape of another kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ModelError;

// =============================================================================
// STEP KINDS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    LlmCall,
    Transform,
    Audio,
}

impl StepType {
    pub const ALL: [StepType; 3] = [StepType::LlmCall, StepType::Transform, StepType::Audio];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::LlmCall => "llm_call",
            StepType::Transform => "transform",
            StepType::Audio => "audio",
        }
    }

    pub fn parse(s: &str) -> Option<StepType> {
        StepType::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// STEP CONFIGS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Extract,
    Classify,
    GenerateShort,
    Analyze,
    Generate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

/// Model invocation: prompts plus sampling parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LlmCallConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cacheable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Field-rename mapping applied to the previous output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_config: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keys of a linear step that sit beside its flattened config.
pub const RESERVED_STEP_KEYS: [&str; 3] = ["id", "name", "type"];

/// Step configuration, one variant per [`StepType`].
///
/// Serializes as the bare config object; the kind travels next to it
/// (`stepType` on a node, `type` on a linear step).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepConfig {
    LlmCall(LlmCallConfig),
    Transform(TransformConfig),
    Audio(AudioConfig),
}

/// A string-valued config field, addressed by its dotted key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField<'a> {
    pub path: String,
    pub value: &'a str,
}

impl StepConfig {
    pub fn step_type(&self) -> StepType {
        match self {
            StepConfig::LlmCall(_) => StepType::LlmCall,
            StepConfig::Transform(_) => StepType::Transform,
            StepConfig::Audio(_) => StepType::Audio,
        }
    }

    /// The config a freshly added node of this kind starts with.
    pub fn default_for(step_type: StepType) -> Self {
        match step_type {
            StepType::LlmCall => StepConfig::LlmCall(LlmCallConfig {
                complexity: Some(Complexity::Extract),
                max_tokens: Some(300),
                temperature: Some(0.7),
                response_format: Some(ResponseFormat::Text),
                cacheable: Some(false),
                vision: Some(false),
                ..Default::default()
            }),
            StepType::Transform => StepConfig::Transform(TransformConfig {
                mapping: Some(BTreeMap::new()),
                ..Default::default()
            }),
            StepType::Audio => StepConfig::Audio(AudioConfig {
                operation: Some("transcribe".into()),
                ..Default::default()
            }),
        }
    }

    /// Build the typed config of `step_type` from a JSON object. `null` is an empty config.
    ///
    /// A linear step writes its config next to `id`, `name` and `type`, so a
    /// config carrying any of those keys is rejected.
    pub fn from_value(step_type: StepType, value: Value) -> Result<Self, ModelError> {
        let map = match value {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            _ => return Err(ModelError::NotAnObject(step_type)),
        };
        if let Some(&key) = RESERVED_STEP_KEYS.iter().find(|k| map.contains_key(**k)) {
            return Err(ModelError::ReservedKey { step_type, key });
        }

        let value = Value::Object(map);
        let invalid = |source| ModelError::InvalidConfig { step_type, source };
        let config = match step_type {
            StepType::LlmCall => {
                StepConfig::LlmCall(serde_json::from_value(value).map_err(invalid)?)
            }
            StepType::Transform => {
                StepConfig::Transform(serde_json::from_value(value).map_err(invalid)?)
            }
            StepType::Audio => {
                StepConfig::Audio(serde_json::from_value(value).map_err(invalid)?)
            }
        };
        Ok(config)
    }

    pub fn to_map(&self) -> Result<Map<String, Value>, ModelError> {
        let step_type = self.step_type();
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ModelError::NotAnObject(step_type)),
            Err(source) => Err(ModelError::InvalidConfig { step_type, source }),
        }
    }

    /// Shallow-merge `patch` over the top-level config keys.
    ///
    /// On failure the config is left as it was.
    pub fn merge(&mut self, patch: &Map<String, Value>) -> Result<(), ModelError> {
        let mut current = self.to_map()?;
        for (key, value) in patch {
            current.insert(key.clone(), value.clone());
        }
        *self = StepConfig::from_value(self.step_type(), Value::Object(current))?;
        Ok(())
    }

    /// Every string-valued field, nested objects and arrays included.
    pub fn text_fields(&self) -> Vec<TextField<'_>> {
        let mut out = Vec::new();
        match self {
            StepConfig::LlmCall(c) => {
                push_text("system_prompt", c.system_prompt.as_deref(), &mut out);
                push_text("user_prompt", c.user_prompt.as_deref(), &mut out);
                collect_map_strings("", &c.extra, &mut out);
            }
            StepConfig::Transform(c) => {
                if let Some(mapping) = &c.mapping {
                    for (key, value) in mapping {
                        out.push(TextField {
                            path: format!("mapping.{}", key),
                            value,
                        });
                    }
                }
                collect_map_strings("", &c.extra, &mut out);
            }
            StepConfig::Audio(c) => {
                push_text("operation", c.operation.as_deref(), &mut out);
                if let Some(audio) = &c.audio_config {
                    collect_map_strings("audio_config", audio, &mut out);
                }
                collect_map_strings("", &c.extra, &mut out);
            }
        }
        out
    }
}

fn push_text<'a>(path: &str, value: Option<&'a str>, out: &mut Vec<TextField<'a>>) {
    if let Some(value) = value {
        out.push(TextField {
            path: path.to_string(),
            value,
        });
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn collect_map_strings<'a>(
    prefix: &str,
    map: &'a Map<String, Value>,
    out: &mut Vec<TextField<'a>>,
) {
    for (key, value) in map {
        collect_value_strings(&join_path(prefix, key), value, out);
    }
}

fn collect_value_strings<'a>(path: &str, value: &'a Value, out: &mut Vec<TextField<'a>>) {
    match value {
        Value::String(s) => out.push(TextField {
            path: path.to_string(),
            value: s,
        }),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_value_strings(&format!("{}[{}]", path, i), item, out);
            }
        }
        Value::Object(map) => collect_map_strings(path, map, out),
        _ => {}
    }
}

// =============================================================================
// NODES, EDGES, GRAPH
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

/// Step data carried by a node. `stepType` is derived from the config variant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNodeData")]
pub struct NodeData {
    pub step_id: String,
    pub name: String,
    pub config: StepConfig,
}

impl NodeData {
    pub fn step_type(&self) -> StepType {
        self.config.step_type()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNodeData {
    #[serde(default)]
    step_id: String,
    #[serde(default)]
    name: String,
    step_type: StepType,
    #[serde(default)]
    config: Value,
}

impl TryFrom<RawNodeData> for NodeData {
    type Error = ModelError;

    fn try_from(raw: RawNodeData) -> Result<Self, Self::Error> {
        Ok(NodeData {
            step_id: raw.step_id,
            name: raw.name,
            config: StepConfig::from_value(raw.step_type, raw.config)?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeDataRef<'a> {
    step_id: &'a str,
    name: &'a str,
    step_type: StepType,
    config: &'a StepConfig,
}

impl Serialize for NodeData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeDataRef {
            step_id: &self.step_id,
            name: &self.name,
            step_type: self.step_type(),
            config: &self.config,
        }
        .serialize(serializer)
    }
}

/// A visual node. The renderer's `type` key mirrors `data.stepType` and is
/// ignored on input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecipeNode {
    pub id: String,
    #[serde(default)]
    pub position: Position,
    pub data: NodeData,
}

impl RecipeNode {
    pub fn step_type(&self) -> StepType {
        self.data.step_type()
    }
}

#[derive(Serialize)]
struct RecipeNodeRef<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: StepType,
    position: &'a Position,
    data: &'a NodeData,
}

impl Serialize for RecipeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RecipeNodeRef {
            id: &self.id,
            kind: self.step_type(),
            position: &self.position,
            data: &self.data,
        }
        .serialize(serializer)
    }
}

pub const DEFAULT_EDGE_TYPE: &str = "smoothstep";

fn default_edge_type() -> String {
    DEFAULT_EDGE_TYPE.to_string()
}

/// Directed dependency: `target` runs after `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default = "default_edge_type")]
    pub kind: String,
}

impl RecipeEdge {
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

fn default_category() -> String {
    "general".to_string()
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Recipe-level identity and declared schemas, opaque to the graph algorithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "empty_object")]
    pub input_schema: Value,
    #[serde(default = "empty_object")]
    pub output_schema: Value,
}

impl Default for RecipeMetadata {
    fn default() -> Self {
        RecipeMetadata {
            name: String::new(),
            description: String::new(),
            category: default_category(),
            input_schema: empty_object(),
            output_schema: empty_object(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecipeGraph {
    #[serde(default)]
    pub nodes: Vec<RecipeNode>,
    #[serde(default)]
    pub edges: Vec<RecipeEdge>,
    #[serde(default)]
    pub metadata: RecipeMetadata,
}

impl RecipeGraph {
    pub fn new(metadata: RecipeMetadata) -> Self {
        RecipeGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
            metadata,
        }
    }

    pub fn node(&self, id: &str) -> Option<&RecipeNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut RecipeNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn node_by_step_id(&self, step_id: &str) -> Option<&RecipeNode> {
        self.nodes.iter().find(|n| n.data.step_id == step_id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn contains_step_id(&self, step_id: &str) -> bool {
        self.node_by_step_id(step_id).is_some()
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e.id == id)
    }

    pub fn incident_edges<'a>(
        &'a self,
        node_id: &'a str,
    ) -> impl Iterator<Item = &'a RecipeEdge> + 'a {
        self.edges.iter().filter(move |e| e.touches(node_id))
    }
}
