//! Application layer - orchestration between the domain and ports.
//!
//! - `plan_generation` - builds the generation request and absorbs failures
//! - `intake_session` - binds one interview to its plan, discarding stale results

mod intake_session;
mod plan_generation;

pub use intake_session::{IntakeSession, PlanTicket, SessionError};
pub use plan_generation::{PlanGenerationClient, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
