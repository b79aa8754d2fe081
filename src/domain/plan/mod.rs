//! Plan module - the narrative output of an interview.
//!
//! - `plan` - the five-field plan, its fallback and response parsing
//! - `summary` - the bounded patient summary and generation prompt

mod plan;
mod summary;

pub use plan::{plan_response_schema, Plan, PlanError, PlanOrigin, PlanSections, PLAN_FIELDS};
pub use summary::{plan_prompt, PatientSummary, SummarySection, MAX_VALUE_CHARS, NOT_PROVIDED};
