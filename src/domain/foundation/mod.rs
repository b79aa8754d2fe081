//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, error types and the state machine
//! trait that the rest of the intake domain builds on.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::InterviewId;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
