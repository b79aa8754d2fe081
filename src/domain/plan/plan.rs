//! The narrative weight-management plan.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::foundation::Timestamp;

/// JSON names of the five narrative fields, in display order.
pub const PLAN_FIELDS: [&str; 5] = [
    "assessmentSummary",
    "healthyEating",
    "physicalActivity",
    "behaviorAndMindset",
    "treatmentConsiderations",
];

const FALLBACK_ASSESSMENT: &str = "There was an error generating your personalized assessment. Please review the information with your healthcare provider.";
const FALLBACK_EATING: &str = "General advice is to focus on a balanced diet with plenty of fruits, vegetables, and lean protein, while limiting processed foods and sugary drinks.";
const FALLBACK_ACTIVITY: &str = "Starting with regular, gentle activity like walking is recommended for most people. Please consult your doctor before starting a new exercise program.";
const FALLBACK_BEHAVIOR: &str = "Focusing on getting adequate sleep and managing stress are key components of a healthy lifestyle.";
const FALLBACK_TREATMENT: &str = "We couldn't generate a fully personalized recommendation, so this plan contains general guidance only. It is essential to discuss your full health profile with your healthcare provider before considering any treatment.";

/// Whether a plan came from the generation service or the canned fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanOrigin {
    Generated,
    Fallback,
}

/// Why a generated payload could not become a plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("plan payload is not valid JSON: {0}")]
    Malformed(String),

    #[error("plan field '{0}' is blank")]
    BlankField(&'static str),
}

/// The five narrative fields as the generation service returns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSections {
    pub assessment_summary: String,
    pub healthy_eating: String,
    pub physical_activity: String,
    pub behavior_and_mindset: String,
    pub treatment_considerations: String,
}

impl PlanSections {
    /// Parses a generated payload. Missing and blank fields are both errors.
    ///
    /// A payload wrapped in a markdown code fence is accepted.
    pub fn parse(payload: &str) -> Result<Self, PlanError> {
        let sections: Self = serde_json::from_str(strip_code_fence(payload))
            .map_err(|e| PlanError::Malformed(e.to_string()))?;
        sections.validate()?;
        Ok(sections)
    }

    fn fields(&self) -> [(&'static str, &str); 5] {
        [
            (PLAN_FIELDS[0], &self.assessment_summary),
            (PLAN_FIELDS[1], &self.healthy_eating),
            (PLAN_FIELDS[2], &self.physical_activity),
            (PLAN_FIELDS[3], &self.behavior_and_mindset),
            (PLAN_FIELDS[4], &self.treatment_considerations),
        ]
    }

    fn validate(&self) -> Result<(), PlanError> {
        match self.fields().into_iter().find(|(_, text)| text.trim().is_empty()) {
            Some((name, _)) => Err(PlanError::BlankField(name)),
            None => Ok(()),
        }
    }
}

/// JSON schema hint sent with every generation request.
pub fn plan_response_schema() -> Value {
    let properties: serde_json::Map<String, Value> = PLAN_FIELDS
        .iter()
        .map(|name| (name.to_string(), json!({ "type": "string" })))
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": PLAN_FIELDS,
    })
}

fn strip_code_fence(payload: &str) -> &str {
    let trimmed = payload.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// The terminal output of an interview.
///
/// Each call to plan generation produces a new instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(flatten)]
    pub sections: PlanSections,
    pub origin: PlanOrigin,
    pub generated_at: Timestamp,
}

impl Plan {
    /// Wraps sections produced by the generation service.
    pub fn generated(sections: PlanSections) -> Self {
        Self {
            sections,
            origin: PlanOrigin::Generated,
            generated_at: Timestamp::now(),
        }
    }

    /// Generic, non-personalized plan used whenever generation fails.
    pub fn fallback() -> Self {
        Self {
            sections: PlanSections {
                assessment_summary: FALLBACK_ASSESSMENT.to_string(),
                healthy_eating: FALLBACK_EATING.to_string(),
                physical_activity: FALLBACK_ACTIVITY.to_string(),
                behavior_and_mindset: FALLBACK_BEHAVIOR.to_string(),
                treatment_considerations: FALLBACK_TREATMENT.to_string(),
            },
            origin: PlanOrigin::Fallback,
            generated_at: Timestamp::now(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == PlanOrigin::Fallback
    }

    /// Titled sections in display order.
    pub fn titled_sections(&self) -> [(&'static str, &str); 5] {
        let s = &self.sections;
        [
            ("Assessment Summary", &s.assessment_summary),
            ("Healthy Eating", &s.healthy_eating),
            ("Physical Activity", &s.physical_activity),
            ("Behavior and Mindset", &s.behavior_and_mindset),
            ("Treatment Considerations", &s.treatment_considerations),
        ]
    }
}
