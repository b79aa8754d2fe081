//! Interview-specific error types.
//!
//! These cover caller contract violations and flow defects. An answer that
//! fails a step's validator is not an error; the engine returns it as a
//! rejected output and stays on the step.

use thiserror::Error;

use crate::domain::classification::{MeasurementCategory, Unit};
use crate::domain::flow::{FlowDefinitionError, InputKind};
use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterviewError {
    /// The flow definition is defective.
    #[error("flow configuration error: {0}")]
    Configuration(#[from] FlowDefinitionError),

    #[error("step '{step}' expects a {expected} answer")]
    AnswerKindMismatch {
        step: &'static str,
        expected: InputKind,
    },

    #[error("'{label}' is not an option of step '{step}'")]
    UnknownOption { step: &'static str, label: String },

    #[error("interview has finished at step '{0}'")]
    Finished(&'static str),

    #[error("no clarification is pending")]
    NoClarificationPending,

    #[error("unit '{unit}' does not measure {category}")]
    UnitMismatch {
        category: MeasurementCategory,
        unit: Unit,
    },

    /// Restored state names a step the flow does not have, or a detour
    /// that does not line up with the flow.
    #[error("restored state is inconsistent: {0}")]
    InconsistentState(String),

    #[error("invalid status transition: {0}")]
    InvalidTransition(#[from] ValidationError),
}

impl InterviewError {
    /// Returns true for defects in the flow rather than in the caller.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
