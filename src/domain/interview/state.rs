//! Interview state owned by the engine.

use serde::{Deserialize, Serialize};

use crate::domain::classification::UnitSelection;
use crate::domain::flow::{AnswerValue, Answers};
use crate::domain::foundation::Timestamp;

/// Continuation of a clarification detour.
///
/// Captures where the interview resumes once the free-text detail arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingClarification {
    /// Storage key of the step whose answer triggered the detour.
    pub originating_key: String,
    /// Step the original answer leads to.
    pub resume_step_id: String,
    /// Original answer, when it is recorded only together with the detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deferred_answer: Option<AnswerValue>,
}

/// Everything needed to resume an interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewState {
    pub current_step_id: String,
    pub answers: Answers,
    pub units: UnitSelection,
    #[serde(default)]
    pub pending_clarification: Option<PendingClarification>,
    pub started_at: Timestamp,
}

impl InterviewState {
    /// Fresh state positioned at `entry` with default units.
    pub fn new(entry: &str) -> Self {
        Self {
            current_step_id: entry.to_string(),
            answers: Answers::new(),
            units: UnitSelection::default(),
            pending_clarification: None,
            started_at: Timestamp::now(),
        }
    }

    pub fn is_clarifying(&self) -> bool {
        self.pending_clarification.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classification::{LengthUnit, WeightUnit};

    #[test]
    fn new_state_is_empty_at_entry() {
        let state = InterviewState::new("welcome");
        assert_eq!(state.current_step_id, "welcome");
        assert!(state.answers.is_empty());
        assert!(!state.is_clarifying());
        assert_eq!(state.units, UnitSelection::default());
    }

    #[test]
    fn survives_json_round_trip_mid_detour() {
        let mut state = InterviewState::new("welcome");
        state.current_step_id = "prompt_for_other_text".to_string();
        state.answers.record("age", AnswerValue::Number(42.0));
        state.units = UnitSelection::new(WeightUnit::Lbs, LengthUnit::In);
        state.pending_clarification = Some(PendingClarification {
            originating_key: "gender".to_string(),
            resume_step_id: "ethnicity".to_string(),
            deferred_answer: Some(AnswerValue::text("Other (please specify)")),
        });

        let json = serde_json::to_string(&state).unwrap();
        let restored: InterviewState = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, state);
    }

    #[test]
    fn deferred_answer_is_omitted_when_absent() {
        let pending = PendingClarification {
            originating_key: "weight_loss_methods".to_string(),
            resume_step_id: "weight_loss_supervision".to_string(),
            deferred_answer: None,
        };

        let json = serde_json::to_value(&pending).unwrap();

        assert!(json.get("deferred_answer").is_none());
    }
}
