//! Flow module - the declarative interview graph.
//!
//! - `step` - steps, input kinds and next-step edges
//! - `answer` - answer values and the answer store
//! - `definition` - the validated graph and clarification rules
//! - `intake` - the weight-management intake flow

mod answer;
mod definition;
pub mod intake;
mod step;

pub use answer::{AnswerValue, Answers};
pub use definition::{ClarificationRule, FlowDefinition, FlowDefinitionError, MarkerMatch};
pub use intake::{classification_input, intake_flow};
pub use step::{
    InputDescriptor, InputKind, NextStep, NextStepFn, ScaleRange, Step, StepPrompt, Validator,
};
