//! Diagnostics and error types shared by every phase.

use serde::Serialize;
use thiserror::Error;

use crate::parse::types::StepType;
use crate::validate::ValidationReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Parse,
    Compile,
    Validate,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Compile => write!(f, "Compile"),
            Phase::Validate => write!(f, "Validate"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A coded finding tied to a phase and, when possible, to the node at fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub code: String,
    pub phase: Phase,
    pub severity: Severity,
    pub message: String,
    pub node_id: Option<String>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node_id {
            Some(id) => write!(
                f,
                "[{}:{}] {} (node '{}')",
                self.phase, self.code, self.message, id
            ),
            None => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

impl Diagnostic {
    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            code: code.into(),
            phase: Phase::Parse,
            severity: Severity::Error,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn error(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        Diagnostic {
            code: code.into(),
            phase: Phase::Validate,
            severity: Severity::Error,
            message: message.into(),
            node_id,
        }
    }

    pub fn warning(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        Diagnostic {
            code: code.into(),
            phase: Phase::Validate,
            severity: Severity::Warning,
            message: message.into(),
            node_id,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Message shared by the compiler and the validator when a cycle blocks ordering.
pub const CYCLE_MESSAGE: &str = "Workflow contains cycles; all workflows must be acyclic";

/// Raised when a graph cannot be linearized because some nodes sit on a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} (unordered nodes: {})", CYCLE_MESSAGE, .nodes.join(", "))]
pub struct CycleError {
    /// Node ids left over once Kahn's queue drained, in node-array order.
    pub nodes: Vec<String>,
}

impl From<CycleError> for Diagnostic {
    fn from(e: CycleError) -> Self {
        Diagnostic {
            code: "L001".into(),
            phase: Phase::Compile,
            severity: Severity::Error,
            message: e.to_string(),
            node_id: e.nodes.first().cloned(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid {step_type} config: {source}")]
    InvalidConfig {
        step_type: StepType,
        #[source]
        source: serde_json::Error,
    },

    #[error("config for a {0} step must be a JSON object")]
    NotAnObject(StepType),

    #[error("config for a {step_type} step cannot set '{key}'; it belongs to the step itself")]
    ReservedKey {
        step_type: StepType,
        key: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("editor session has been discarded")]
    Discarded,

    #[error("node '{0}' does not exist")]
    NodeNotFound(String),

    #[error("edge '{0}' does not exist")]
    EdgeNotFound(String),

    #[error(transparent)]
    Config(#[from] ModelError),

    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error("recipe is not valid: {} error(s)", .0.errors.len())]
    Invalid(Box<ValidationReport>),
}
