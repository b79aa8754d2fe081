//! Flow definition: the validated graph of interview steps.
//!
//! A definition is checked once, when it is built. Every fixed edge must
//! point at a known step, informational steps must chain through fixed
//! edges without cycles, and every clarification rule must name a free-text
//! step. Defects here are configuration errors and stop the interview from
//! starting at all.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::answer::AnswerValue;
use super::step::{InputKind, NextStep, Step};

/// Defects in a flow definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowDefinitionError {
    #[error("step '{0}' is defined more than once")]
    DuplicateStep(&'static str),

    #[error("entry step '{0}' is not defined")]
    MissingEntry(&'static str),

    #[error("step '{from}' points at undefined step '{to}'")]
    UndefinedStep { from: &'static str, to: String },

    #[error("step '{0}' requires input but has no next step")]
    MissingNext(&'static str),

    #[error("step '{0}' offers no options")]
    MissingOptions(&'static str),

    #[error("informational step '{0}' must use a fixed next step")]
    ComputedInformational(&'static str),

    #[error("informational steps form a cycle: {}", .0.join(" -> "))]
    InformationalCycle(Vec<&'static str>),

    #[error("clarification step '{0}' is not a free-text step")]
    InvalidClarificationStep(&'static str),
}

/// How a reserved marker is matched against a selected label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerMatch {
    Exact,
    Contains,
}

/// An option that needs free-text elaboration before the interview resumes.
#[derive(Debug, Clone)]
pub struct ClarificationRule {
    pub marker: &'static str,
    pub matching: MarkerMatch,
    /// Free-text step that collects the elaboration.
    pub step: &'static str,
    /// Record the original answer before the detour. When false the answer
    /// is held back and recorded together with the elaboration.
    pub record_immediately: bool,
    /// Key for the elaboration; defaults to `<originating key>_other`.
    pub key_override: Option<&'static str>,
}

impl ClarificationRule {
    /// "Other (please specify)"-style rule: answer held back, `_other` key.
    pub fn other(marker: &'static str, step: &'static str) -> Self {
        Self {
            marker,
            matching: MarkerMatch::Contains,
            step,
            record_immediately: false,
            key_override: None,
        }
    }

    /// Exact-label rule that records the answer and stores the elaboration
    /// under a fixed key.
    pub fn specify(marker: &'static str, step: &'static str, key: &'static str) -> Self {
        Self {
            marker,
            matching: MarkerMatch::Exact,
            step,
            record_immediately: true,
            key_override: Some(key),
        }
    }

    fn matches_label(&self, label: &str) -> bool {
        match self.matching {
            MarkerMatch::Exact => label == self.marker,
            MarkerMatch::Contains => label.contains(self.marker),
        }
    }

    /// Returns true if the answer, or any selected label of it, carries the marker.
    pub fn matches(&self, answer: &AnswerValue) -> bool {
        answer.labels().any(|label| self.matches_label(label))
    }

    /// Key the elaboration text is recorded under.
    pub fn clarification_key(&self, originating_key: &str) -> String {
        match self.key_override {
            Some(key) => key.to_string(),
            None => format!("{}_other", originating_key),
        }
    }
}

/// The validated interview graph.
#[derive(Debug, Clone)]
pub struct FlowDefinition {
    entry: &'static str,
    steps: HashMap<&'static str, Step>,
    order: Vec<&'static str>,
    clarification_rules: Vec<ClarificationRule>,
}

impl FlowDefinition {
    /// Builds and validates a flow definition.
    pub fn new(
        entry: &'static str,
        steps: Vec<Step>,
        clarification_rules: Vec<ClarificationRule>,
    ) -> Result<Self, FlowDefinitionError> {
        let mut by_id = HashMap::with_capacity(steps.len());
        let mut order = Vec::with_capacity(steps.len());
        for step in steps {
            let id = step.id;
            if by_id.insert(id, step).is_some() {
                return Err(FlowDefinitionError::DuplicateStep(id));
            }
            order.push(id);
        }

        let definition = Self {
            entry,
            steps: by_id,
            order,
            clarification_rules,
        };
        definition.check()?;
        Ok(definition)
    }

    pub fn entry(&self) -> &'static str {
        self.entry
    }

    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.get(id)
    }

    /// Steps in authoring order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.order.iter().filter_map(|id| self.steps.get(id))
    }

    pub fn clarification_rules(&self) -> &[ClarificationRule] {
        &self.clarification_rules
    }

    /// First clarification rule triggered by an answer to `step`.
    ///
    /// Only option-based steps can trigger a detour.
    pub fn clarification_for(&self, step: &Step, answer: &AnswerValue) -> Option<&ClarificationRule> {
        if !step.kind.has_options() {
            return None;
        }
        self.clarification_rules.iter().find(|rule| rule.matches(answer))
    }

    /// Returns true if `id` is the target of a clarification rule.
    pub fn is_clarification_step(&self, id: &str) -> bool {
        self.rule_for_step(id).is_some()
    }

    /// The clarification rule that collects its elaboration at step `id`.
    pub fn rule_for_step(&self, id: &str) -> Option<&ClarificationRule> {
        self.clarification_rules.iter().find(|rule| rule.step == id)
    }

    /// Looks up the target of a resolved edge.
    pub fn target(&self, from: &'static str, to: &str) -> Result<&Step, FlowDefinitionError> {
        self.steps
            .get(to)
            .ok_or_else(|| FlowDefinitionError::UndefinedStep {
                from,
                to: to.to_string(),
            })
    }

    fn check(&self) -> Result<(), FlowDefinitionError> {
        if !self.steps.contains_key(self.entry) {
            return Err(FlowDefinitionError::MissingEntry(self.entry));
        }

        for rule in &self.clarification_rules {
            match self.steps.get(rule.step) {
                Some(step) if step.kind == InputKind::FreeText => {}
                Some(_) => return Err(FlowDefinitionError::InvalidClarificationStep(rule.step)),
                None => {
                    return Err(FlowDefinitionError::UndefinedStep {
                        from: rule.marker,
                        to: rule.step.to_string(),
                    })
                }
            }
        }

        for step in self.steps() {
            if step.kind.has_options() && step.options.is_empty() {
                return Err(FlowDefinitionError::MissingOptions(step.id));
            }

            match (&step.next, step.kind) {
                (Some(NextStep::Fixed(to)), _) => {
                    self.target(step.id, to)?;
                }
                (Some(NextStep::Computed(_)), InputKind::Informational) => {
                    return Err(FlowDefinitionError::ComputedInformational(step.id));
                }
                (Some(NextStep::Computed(_)), _) => {}
                (None, kind) if kind.is_terminal() => {}
                (None, _) if self.is_clarification_step(step.id) => {}
                (None, _) => return Err(FlowDefinitionError::MissingNext(step.id)),
            }

            if step.kind == InputKind::Informational {
                self.informational_chain(step.id)?;
            }
        }

        Ok(())
    }

    /// Follows fixed edges from an informational step until a step that
    /// needs input (or ends the interview) is reached.
    fn informational_chain(&self, start: &'static str) -> Result<(), FlowDefinitionError> {
        let mut seen = HashSet::new();
        let mut path = Vec::new();
        let mut current = start;

        loop {
            let step = self.target(start, current)?;
            if step.kind != InputKind::Informational {
                return Ok(());
            }
            if !seen.insert(step.id) {
                path.push(step.id);
                return Err(FlowDefinitionError::InformationalCycle(path));
            }
            path.push(step.id);
            match step.next {
                Some(NextStep::Fixed(to)) => current = to,
                Some(NextStep::Computed(_)) => {
                    return Err(FlowDefinitionError::ComputedInformational(step.id))
                }
                None => return Err(FlowDefinitionError::MissingNext(step.id)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flow::answer::Answers;

    fn to_end(_: &AnswerValue, _: &Answers) -> &'static str {
        "end"
    }

    fn minimal_steps() -> Vec<Step> {
        vec![
            Step::choice("start", "Begin?", &["Yes", "Other (please specify)"]).next("end"),
            Step::free_text("clarify", "Please provide more details."),
            Step::summary("end", "Done."),
        ]
    }

    #[test]
    fn accepts_valid_definition() {
        let flow = FlowDefinition::new(
            "start",
            minimal_steps(),
            vec![ClarificationRule::other("Other (please specify)", "clarify")],
        )
        .unwrap();

        assert_eq!(flow.entry(), "start");
        assert_eq!(flow.steps().count(), 3);
        assert!(flow.is_clarification_step("clarify"));
    }

    #[test]
    fn rejects_duplicate_step() {
        let mut steps = minimal_steps();
        steps.push(Step::summary("end", "Again."));

        let err = FlowDefinition::new("start", steps, vec![]).unwrap_err();
        assert_eq!(err, FlowDefinitionError::DuplicateStep("end"));
    }

    #[test]
    fn rejects_missing_entry() {
        let err = FlowDefinition::new("nowhere", minimal_steps(), vec![]).unwrap_err();
        assert_eq!(err, FlowDefinitionError::MissingEntry("nowhere"));
    }

    #[test]
    fn rejects_undefined_fixed_target() {
        let steps = vec![
            Step::choice("start", "Begin?", &["Yes"]).next("missing"),
            Step::summary("end", "Done."),
        ];
        let err = FlowDefinition::new("start", steps, vec![]).unwrap_err();
        assert!(matches!(err, FlowDefinitionError::UndefinedStep { from: "start", .. }));
    }

    #[test]
    fn rejects_interactive_step_without_next() {
        let steps = vec![Step::number("start", "How many?"), Step::summary("end", "Done.")];
        let err = FlowDefinition::new("start", steps, vec![]).unwrap_err();
        assert_eq!(err, FlowDefinitionError::MissingNext("start"));
    }

    #[test]
    fn rejects_informational_cycle() {
        let steps = vec![
            Step::choice("start", "Begin?", &["Yes"]).next("a"),
            Step::info("a", "First note.").next("b"),
            Step::info("b", "Second note.").next("a"),
        ];
        let err = FlowDefinition::new("start", steps, vec![]).unwrap_err();
        assert!(matches!(err, FlowDefinitionError::InformationalCycle(_)));
        assert!(err.to_string().contains("a -> b -> a"));
    }

    #[test]
    fn rejects_computed_edge_on_informational_step() {
        let steps = vec![Step::info("start", "Note.").branch(to_end), Step::summary("end", "Done.")];
        let err = FlowDefinition::new("start", steps, vec![]).unwrap_err();
        assert_eq!(err, FlowDefinitionError::ComputedInformational("start"));
    }

    #[test]
    fn allows_cycles_through_interactive_steps() {
        let steps = vec![
            Step::choice("start", "Again?", &["Yes", "No"]).next("note"),
            Step::info("note", "Looping back.").next("start"),
        ];
        assert!(FlowDefinition::new("start", steps, vec![]).is_ok());
    }

    #[test]
    fn rejects_clarification_rule_pointing_at_non_free_text() {
        let err = FlowDefinition::new(
            "start",
            minimal_steps(),
            vec![ClarificationRule::other("Other", "end")],
        )
        .unwrap_err();
        assert_eq!(err, FlowDefinitionError::InvalidClarificationStep("end"));
    }

    #[test]
    fn rejects_choice_without_options() {
        let steps = vec![Step::choice("start", "Pick", &[]).next("end"), Step::summary("end", "Done.")];
        let err = FlowDefinition::new("start", steps, vec![]).unwrap_err();
        assert_eq!(err, FlowDefinitionError::MissingOptions("start"));
    }

    mod clarification_rules {
        use super::*;

        #[test]
        fn contains_rule_matches_any_selected_label() {
            let rule = ClarificationRule::other("Other (please specify)", "clarify");

            assert!(rule.matches(&AnswerValue::text("Other (please specify)")));
            assert!(rule.matches(&AnswerValue::list(["PCOS", "Other (please specify)"])));
            assert!(!rule.matches(&AnswerValue::text("Other/Prefer not to say")));
            assert!(!rule.matches(&AnswerValue::Number(3.0)));
        }

        #[test]
        fn exact_rule_requires_full_label() {
            let rule = ClarificationRule::specify("Prescription medications", "meds", "meds_key");

            assert!(rule.matches(&AnswerValue::list(["Supplements", "Prescription medications"])));
            assert!(!rule.matches(&AnswerValue::text("Prescription medications only")));
        }

        #[test]
        fn clarification_key_defaults_to_other_suffix() {
            let other = ClarificationRule::other("Other", "clarify");
            let specify = ClarificationRule::specify("Prescription medications", "meds", "meds_key");

            assert_eq!(other.clarification_key("gender"), "gender_other");
            assert_eq!(specify.clarification_key("weight_loss_methods"), "meds_key");
        }

        #[test]
        fn only_option_steps_trigger_detours() {
            let flow = FlowDefinition::new(
                "start",
                minimal_steps(),
                vec![ClarificationRule::other("Other (please specify)", "clarify")],
            )
            .unwrap();
            let answer = AnswerValue::text("Other (please specify)");

            let start = flow.step("start").unwrap();
            let clarify = flow.step("clarify").unwrap();
            assert!(flow.clarification_for(start, &answer).is_some());
            assert!(flow.clarification_for(clarify, &answer).is_none());
        }
    }
}
