//! Interview lifecycle status.

use serde::{Deserialize, Serialize};

use crate::domain::flow::InputKind;
use crate::domain::foundation::StateMachine;

/// Where an interview is in its lifecycle.
///
/// Derived from the current step and the pending clarification, never
/// stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    /// Waiting for an answer to a regular step.
    #[default]
    Collecting,

    /// Detoured to a free-text step for an option that needs detail.
    Clarifying,

    /// Reached the summary step; plan generation follows.
    ReadyForPlan,

    /// Ended early without a plan.
    Exited,
}

impl InterviewStatus {
    /// Status implied by a current step of `kind`.
    pub fn at(kind: InputKind, clarifying: bool) -> Self {
        match kind {
            InputKind::TerminalSummary => Self::ReadyForPlan,
            InputKind::TerminalExit => Self::Exited,
            _ if clarifying => Self::Clarifying,
            _ => Self::Collecting,
        }
    }

    /// Returns true if the engine still accepts answers.
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::Collecting | Self::Clarifying)
    }
}

impl StateMachine for InterviewStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use InterviewStatus::*;
        matches!(
            (self, target),
            (Collecting, Clarifying)
                | (Clarifying, Collecting)
                | (Collecting, ReadyForPlan)
                | (Clarifying, ReadyForPlan)
                | (Collecting, Exited)
                | (Clarifying, Exited)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use InterviewStatus::*;
        match self {
            Collecting => vec![Clarifying, ReadyForPlan, Exited],
            Clarifying => vec![Collecting, ReadyForPlan, Exited],
            ReadyForPlan | Exited => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod derivation {
        use super::*;

        #[test]
        fn terminal_kinds_win_over_clarifying() {
            assert_eq!(InterviewStatus::at(InputKind::TerminalSummary, false), InterviewStatus::ReadyForPlan);
            assert_eq!(InterviewStatus::at(InputKind::TerminalExit, true), InterviewStatus::Exited);
        }

        #[test]
        fn interactive_kinds_follow_pending_flag() {
            assert_eq!(InterviewStatus::at(InputKind::FreeText, true), InterviewStatus::Clarifying);
            assert_eq!(InterviewStatus::at(InputKind::Choice, false), InterviewStatus::Collecting);
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&InterviewStatus::ReadyForPlan).unwrap();
            assert_eq!(json, "\"ready_for_plan\"");
        }
    }

    mod transitions {
        use super::*;

        #[test]
        fn detour_and_resume_are_valid() {
            assert!(InterviewStatus::Collecting.can_transition_to(&InterviewStatus::Clarifying));
            assert!(InterviewStatus::Clarifying.can_transition_to(&InterviewStatus::Collecting));
        }

        #[test]
        fn terminal_statuses_have_no_exits() {
            assert!(InterviewStatus::ReadyForPlan.is_terminal());
            assert!(InterviewStatus::Exited.is_terminal());
            assert!(InterviewStatus::Exited
                .transition_to(InterviewStatus::Collecting)
                .is_err());
        }

        #[test]
        fn only_live_statuses_accept_input() {
            assert!(InterviewStatus::Clarifying.accepts_input());
            assert!(!InterviewStatus::ReadyForPlan.accepts_input());
        }
    }
}
