//! Planning error types

use crate::core::naming::IdentifierKind;
use thiserror::Error;

/// Errors raised while assembling a pipeline topology
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid {kind} name '{name}'")]
    InvalidIdentifier { kind: IdentifierKind, name: String },

    #[error("Duplicate artifact name: {0}")]
    DuplicateArtifact(String),

    #[error("Duplicate stage name: {0}")]
    DuplicateStage(String),

    #[error("Duplicate action name '{action}' in stage '{stage}'")]
    DuplicateAction { stage: String, action: String },

    #[error("Duplicate failure notification rule: {0}")]
    DuplicateNotification(String),

    #[error("Action '{action}' in stage '{stage}' consumes artifact '{artifact}' that no earlier stage produces")]
    UnresolvedArtifact {
        stage: String,
        action: String,
        artifact: String,
    },

    #[error("Stage '{stage}' must consume '{expected}' but action '{action}' consumes '{found}'")]
    BrokenChain {
        stage: String,
        action: String,
        expected: String,
        found: String,
    },

    #[error("Action '{action}' in stage '{stage}' has run order {found}, expected {expected}")]
    RunOrder {
        stage: String,
        action: String,
        expected: u32,
        found: u32,
    },

    #[error("Action '{action}' in stage '{stage}' has no failure notification")]
    MissingNotification { stage: String, action: String },

    #[error("Malformed topology: {0}")]
    MalformedTopology(String),
}

impl PlanError {
    /// Input rejected before any assembly took place
    pub fn is_input_error(&self) -> bool {
        matches!(self, PlanError::InvalidInput(_))
    }

    /// Structurally invalid plan detected during assembly
    pub fn is_configuration_error(&self) -> bool {
        !self.is_input_error()
    }
}
