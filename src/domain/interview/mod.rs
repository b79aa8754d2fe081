//! Interview module - the dialogue flow engine.
//!
//! - `engine` - drives one interview through a flow definition
//! - `state` - the serializable interview state and detour continuation
//! - `status` - lifecycle status derived from the state
//! - `errors` - caller contract violations and flow defects

mod engine;
mod errors;
mod state;
mod status;

pub use engine::{EngineOutput, EngineResponse, InterviewEngine};
pub use errors::InterviewError;
pub use state::{InterviewState, PendingClarification};
pub use status::InterviewStatus;
