//! Domain layer containing the interview, classification and plan logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machines)
//! - `classification` - BMI and waist-to-height classification
//! - `flow` - Interview steps, answers and the intake flow definition
//! - `interview` - The dialogue flow engine and its state
//! - `plan` - The narrative plan, its fallback and the generation prompt

pub mod classification;
pub mod flow;
pub mod foundation;
pub mod interview;
pub mod plan;
