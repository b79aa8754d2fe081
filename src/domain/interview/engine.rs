//! Dialogue flow engine.
//!
//! Drives one interview through a [`FlowDefinition`]. Every operation is a
//! synchronous state transition with no I/O; the shell serializes calls.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::domain::classification::{ClassificationResult, MeasurementCategory, Unit, UnitSelection};
use crate::domain::flow::{
    classification_input, AnswerValue, FlowDefinition, FlowDefinitionError, InputKind, NextStep,
    Step, StepPrompt,
};
use crate::domain::foundation::StateMachine;

use super::errors::InterviewError;
use super::state::{InterviewState, PendingClarification};
use super::status::InterviewStatus;

const DEFAULT_REJECTION: &str = "Please enter a valid value.";

/// What the shell should do next.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineOutput {
    /// Collect an answer for this step.
    AwaitingInput { prompt: StepPrompt },
    /// The answer failed validation; the step is unchanged.
    Rejected { prompt: StepPrompt, error: String },
    /// Summary reached; run plan generation.
    GeneratePlan { prompt: StepPrompt },
    /// Interview ended without a plan.
    Finished { prompt: StepPrompt },
}

impl EngineOutput {
    pub fn prompt(&self) -> &StepPrompt {
        match self {
            Self::AwaitingInput { prompt }
            | Self::Rejected { prompt, .. }
            | Self::GeneratePlan { prompt }
            | Self::Finished { prompt } => prompt,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Result of one engine operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineResponse {
    /// Texts of informational steps passed on the way, in order.
    pub notices: Vec<&'static str>,
    pub output: EngineOutput,
}

impl EngineResponse {
    fn rejected(step: &Step, error: String) -> Self {
        Self {
            notices: Vec::new(),
            output: EngineOutput::Rejected {
                prompt: step.to_prompt(),
                error,
            },
        }
    }

    /// Step the interview now rests on.
    pub fn step_id(&self) -> &'static str {
        self.output.prompt().step_id
    }
}

/// Owns the state of one interview.
#[derive(Debug, Clone)]
pub struct InterviewEngine {
    flow: Arc<FlowDefinition>,
    state: InterviewState,
}

impl InterviewEngine {
    /// Creates an engine positioned at the entry step. Call [`start`] to
    /// receive the first prompt.
    ///
    /// [`start`]: InterviewEngine::start
    pub fn new(flow: Arc<FlowDefinition>) -> Self {
        let state = InterviewState::new(flow.entry());
        Self { flow, state }
    }

    /// Restores a previously serialized interview.
    pub fn from_state(flow: Arc<FlowDefinition>, state: InterviewState) -> Result<Self, InterviewError> {
        let step = flow.step(&state.current_step_id).ok_or_else(|| {
            InterviewError::InconsistentState(format!("unknown step '{}'", state.current_step_id))
        })?;

        if step.kind == InputKind::Informational {
            return Err(InterviewError::InconsistentState(format!(
                "informational step '{}' cannot be current",
                step.id
            )));
        }

        match &state.pending_clarification {
            Some(pending) => {
                if !flow.is_clarification_step(step.id) {
                    return Err(InterviewError::InconsistentState(format!(
                        "step '{}' does not collect clarifications",
                        step.id
                    )));
                }
                if flow.step(&pending.resume_step_id).is_none() {
                    return Err(InterviewError::InconsistentState(format!(
                        "unknown resume step '{}'",
                        pending.resume_step_id
                    )));
                }
            }
            None if flow.is_clarification_step(step.id) => {
                return Err(InterviewError::InconsistentState(format!(
                    "clarification step '{}' has no pending detour",
                    step.id
                )));
            }
            None => {}
        }

        Ok(Self { flow, state })
    }

    /// Resets the interview and returns the first interactive prompt.
    pub fn start(&mut self) -> Result<EngineResponse, InterviewError> {
        let flow = Arc::clone(&self.flow);
        self.state = InterviewState::new(flow.entry());
        info!(entry = flow.entry(), "interview started");
        self.settle(&flow, InterviewStatus::Collecting, flow.entry(), flow.entry())
    }

    /// Submits the answer for the current step.
    ///
    /// While a clarification is pending, a text answer is treated as the
    /// clarification.
    pub fn submit_answer(&mut self, answer: impl Into<AnswerValue>) -> Result<EngineResponse, InterviewError> {
        let answer = answer.into();
        let flow = Arc::clone(&self.flow);
        let step = self.current_step_in(&flow)?;

        if step.kind.is_terminal() {
            return Err(InterviewError::Finished(step.id));
        }
        if self.state.is_clarifying() {
            return match answer {
                AnswerValue::Text(text) => self.submit_clarification(text),
                _ => Err(InterviewError::AnswerKindMismatch {
                    step: step.id,
                    expected: InputKind::FreeText,
                }),
            };
        }

        let answer = normalize(step, answer)?;
        if let Some(error) = rejection(step, &answer, &self.state.units) {
            debug!(step = step.id, "answer rejected");
            return Ok(EngineResponse::rejected(step, error));
        }

        let key = step.answer_key();
        let next = step
            .next
            .ok_or_else(|| defect(FlowDefinitionError::MissingNext(step.id)))?;
        let previous = self.status();

        if let Some(rule) = flow.clarification_for(step, &answer) {
            // Branching sees the original answer, never the elaboration.
            let mut recorded = self.state.answers.clone();
            recorded.record(key, answer.clone());
            let resume = resolve(&flow, step.id, next.resolve(&answer, &recorded))?.id;

            if rule.record_immediately {
                self.state.answers = recorded;
            }
            self.state.pending_clarification = Some(PendingClarification {
                originating_key: key.to_string(),
                resume_step_id: resume.to_string(),
                deferred_answer: (!rule.record_immediately).then_some(answer),
            });
            debug!(step = step.id, clarification = rule.step, resume, "clarification detour");
            return self.settle(&flow, previous, step.id, rule.step);
        }

        let mut recorded = self.state.answers.clone();
        recorded.record(key, answer.clone());
        let to = next.resolve(&answer, &recorded);

        // Answers change only once the move to `to` is known to succeed.
        let kept = std::mem::replace(&mut self.state.answers, recorded);
        match self.settle(&flow, previous, step.id, to) {
            Ok(response) => {
                debug!(step = step.id, key, next = to, "answer recorded");
                Ok(response)
            }
            Err(err) => {
                self.state.answers = kept;
                Err(err)
            }
        }
    }

    /// Records the elaboration for a pending detour and resumes.
    pub fn submit_clarification(&mut self, text: impl Into<String>) -> Result<EngineResponse, InterviewError> {
        let flow = Arc::clone(&self.flow);
        let step = self.current_step_in(&flow)?;
        let pending = self
            .state
            .pending_clarification
            .clone()
            .ok_or(InterviewError::NoClarificationPending)?;
        let rule = flow.rule_for_step(step.id).ok_or_else(|| {
            InterviewError::InconsistentState(format!("step '{}' does not collect clarifications", step.id))
        })?;

        let answer = AnswerValue::Text(text.into());
        if let Some(error) = rejection(step, &answer, &self.state.units) {
            debug!(step = step.id, "clarification rejected");
            return Ok(EngineResponse::rejected(step, error));
        }
        resolve(&flow, step.id, &pending.resume_step_id)?;

        let previous = self.status();
        if let Some(deferred) = pending.deferred_answer {
            self.state.answers.record(pending.originating_key.clone(), deferred);
        }
        let key = rule.clarification_key(&pending.originating_key);
        debug!(step = step.id, key = %key, resume = %pending.resume_step_id, "clarification recorded");
        self.state.answers.record(key, answer);
        self.state.pending_clarification = None;

        self.settle(&flow, previous, step.id, &pending.resume_step_id)
    }

    /// Selects the unit for a measurement category.
    ///
    /// Affects only how later number-with-unit answers are validated and
    /// how classification reads stored values.
    pub fn set_unit(&mut self, category: MeasurementCategory, unit: Unit) -> Result<(), InterviewError> {
        self.state
            .units
            .select(category, unit)
            .map_err(|_| InterviewError::UnitMismatch { category, unit })?;
        debug!(%category, %unit, "unit selected");
        Ok(())
    }

    pub fn status(&self) -> InterviewStatus {
        self.current_step()
            .map(|step| InterviewStatus::at(step.kind, self.state.is_clarifying()))
            .unwrap_or_default()
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.flow.step(&self.state.current_step_id)
    }

    /// Prompt for the step the interview rests on.
    pub fn current_prompt(&self) -> Option<StepPrompt> {
        self.current_step().map(Step::to_prompt)
    }

    /// Classification of the answers recorded so far.
    pub fn classification(&self) -> ClassificationResult {
        ClassificationResult::classify(&classification_input(&self.state.answers, self.state.units))
    }

    pub fn state(&self) -> &InterviewState {
        &self.state
    }

    pub fn into_state(self) -> InterviewState {
        self.state
    }

    pub fn units(&self) -> UnitSelection {
        self.state.units
    }

    pub fn flow(&self) -> &Arc<FlowDefinition> {
        &self.flow
    }

    fn current_step_in<'a>(&self, flow: &'a FlowDefinition) -> Result<&'a Step, InterviewError> {
        flow.step(&self.state.current_step_id).ok_or_else(|| {
            InterviewError::InconsistentState(format!("unknown step '{}'", self.state.current_step_id))
        })
    }

    /// Moves to `to`, passing through informational steps, and reports the
    /// step that now waits.
    fn settle(
        &mut self,
        flow: &FlowDefinition,
        previous: InterviewStatus,
        from: &'static str,
        to: &str,
    ) -> Result<EngineResponse, InterviewError> {
        let mut step = resolve(flow, from, to)?;
        let mut notices = Vec::new();
        let mut chain: Vec<&'static str> = Vec::new();

        while step.kind == InputKind::Informational {
            if chain.contains(&step.id) {
                chain.push(step.id);
                return Err(defect(FlowDefinitionError::InformationalCycle(chain)));
            }
            chain.push(step.id);
            notices.push(step.prompt);

            let next = match step.next {
                Some(NextStep::Fixed(id)) => id,
                Some(NextStep::Computed(_)) => {
                    return Err(defect(FlowDefinitionError::ComputedInformational(step.id)))
                }
                None => return Err(defect(FlowDefinitionError::MissingNext(step.id))),
            };
            step = resolve(flow, step.id, next)?;
        }

        let status = InterviewStatus::at(step.kind, self.state.is_clarifying());
        if status != previous {
            previous.transition_to(status)?;
        }
        self.state.current_step_id = step.id.to_string();
        debug!(step = step.id, ?status, "awaiting step");

        let prompt = step.to_prompt();
        let output = match step.kind {
            InputKind::TerminalSummary => {
                info!(answers = self.state.answers.len(), "interview complete");
                EngineOutput::GeneratePlan { prompt }
            }
            InputKind::TerminalExit => {
                info!(step = step.id, "interview ended early");
                EngineOutput::Finished { prompt }
            }
            _ => EngineOutput::AwaitingInput { prompt },
        };

        Ok(EngineResponse { notices, output })
    }
}

fn defect(err: FlowDefinitionError) -> InterviewError {
    error!(error = %err, "flow definition defect");
    InterviewError::Configuration(err)
}

fn resolve<'a>(flow: &'a FlowDefinition, from: &'static str, to: &str) -> Result<&'a Step, InterviewError> {
    flow.target(from, to).map_err(defect)
}

/// Checks the answer's shape against the step and converts numeric text.
fn normalize(step: &Step, answer: AnswerValue) -> Result<AnswerValue, InterviewError> {
    if !step.kind.accepts(&answer) {
        return Err(InterviewError::AnswerKindMismatch {
            step: step.id,
            expected: step.kind,
        });
    }

    match step.kind {
        InputKind::Number | InputKind::NumberWithUnit | InputKind::Scale => Ok(match answer.as_number() {
            Some(value) => AnswerValue::Number(value),
            None => answer,
        }),
        InputKind::Choice | InputKind::MultiChoice => {
            if let Some(label) = answer.labels().find(|label| !step.options.contains(label)) {
                return Err(InterviewError::UnknownOption {
                    step: step.id,
                    label: label.to_string(),
                });
            }
            Ok(answer)
        }
        _ => Ok(answer),
    }
}

/// Error text if the answer fails the step's range or validator.
fn rejection(step: &Step, answer: &AnswerValue, units: &UnitSelection) -> Option<String> {
    if let Some(range) = step.scale {
        if !answer.as_number().is_some_and(|value| range.contains(value)) {
            return Some(match step.error_text {
                Some(text) => text.to_string(),
                None => format!("Please choose a whole number from {} to {}.", range.min, range.max),
            });
        }
    }

    match step.validator {
        Some(valid) if !valid(answer, units) => Some(step.error_text.unwrap_or(DEFAULT_REJECTION).to_string()),
        _ => None,
    }
}
