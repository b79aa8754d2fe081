//! Interview steps: the nodes of the flow graph.

use serde::Serialize;
use std::fmt;

use crate::domain::classification::{MeasurementCategory, UnitSelection};

use super::answer::{AnswerValue, Answers};

/// Predicate over a raw answer. The current unit selection is passed so
/// number-with-unit steps can check ranges in the unit the user picked.
pub type Validator = fn(&AnswerValue, &UnitSelection) -> bool;

/// Computes the next step id from the answer and the answers recorded so far
/// (including the one just written).
pub type NextStepFn = fn(&AnswerValue, &Answers) -> &'static str;

/// How the answer to a step is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Single label from the option set.
    Choice,
    Number,
    /// Number interpreted in the unit selected for the step's category.
    NumberWithUnit,
    /// Ordered labels from the option set.
    MultiChoice,
    /// Whole number within an inclusive range.
    Scale,
    FreeText,
    /// Text only; the engine moves past it without input.
    Informational,
    /// End of interview, plan generation follows.
    TerminalSummary,
    /// End of interview without a plan.
    TerminalExit,
}

impl InputKind {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::TerminalSummary | Self::TerminalExit)
    }

    /// Returns true if the step waits for the user.
    pub fn requires_input(&self) -> bool {
        !self.is_terminal() && !matches!(self, Self::Informational)
    }

    /// Returns true if the step offers selectable labels.
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Choice | Self::MultiChoice)
    }

    /// Returns true if `answer` has the shape this kind collects.
    pub fn accepts(&self, answer: &AnswerValue) -> bool {
        match self {
            Self::Choice | Self::FreeText => matches!(answer, AnswerValue::Text(_)),
            Self::Number | Self::NumberWithUnit | Self::Scale => answer.as_number().is_some(),
            Self::MultiChoice => matches!(answer, AnswerValue::List(_)),
            Self::Informational | Self::TerminalSummary | Self::TerminalExit => false,
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Choice => "choice",
            Self::Number => "number",
            Self::NumberWithUnit => "number with unit",
            Self::MultiChoice => "multi-choice",
            Self::Scale => "scale",
            Self::FreeText => "free text",
            Self::Informational => "informational",
            Self::TerminalSummary => "summary",
            Self::TerminalExit => "exit",
        };
        f.write_str(s)
    }
}

/// Inclusive bounds of a scale step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScaleRange {
    pub min: i32,
    pub max: i32,
}

impl ScaleRange {
    pub fn contains(&self, value: f64) -> bool {
        value.fract() == 0.0 && value >= f64::from(self.min) && value <= f64::from(self.max)
    }
}

/// Where the interview goes after a step.
#[derive(Debug, Clone, Copy)]
pub enum NextStep {
    Fixed(&'static str),
    Computed(NextStepFn),
}

impl NextStep {
    /// Resolves the edge for an answer.
    pub fn resolve(&self, answer: &AnswerValue, answers: &Answers) -> &'static str {
        match self {
            Self::Fixed(id) => *id,
            Self::Computed(next) => next(answer, answers),
        }
    }
}

/// One node of the flow graph.
#[derive(Debug, Clone)]
pub struct Step {
    pub id: &'static str,
    pub prompt: &'static str,
    pub kind: InputKind,
    /// Display order is significant.
    pub options: &'static [&'static str],
    pub storage_key: Option<&'static str>,
    pub validator: Option<Validator>,
    pub error_text: Option<&'static str>,
    pub next: Option<NextStep>,
    pub unit_category: Option<MeasurementCategory>,
    pub scale: Option<ScaleRange>,
    pub placeholder: Option<&'static str>,
}

impl Step {
    fn new(id: &'static str, prompt: &'static str, kind: InputKind) -> Self {
        Self {
            id,
            prompt,
            kind,
            options: &[],
            storage_key: None,
            validator: None,
            error_text: None,
            next: None,
            unit_category: None,
            scale: None,
            placeholder: None,
        }
    }

    pub fn choice(id: &'static str, prompt: &'static str, options: &'static [&'static str]) -> Self {
        Self {
            options,
            ..Self::new(id, prompt, InputKind::Choice)
        }
    }

    pub fn multi_choice(
        id: &'static str,
        prompt: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            options,
            ..Self::new(id, prompt, InputKind::MultiChoice)
        }
    }

    pub fn number(id: &'static str, prompt: &'static str) -> Self {
        Self::new(id, prompt, InputKind::Number)
    }

    pub fn measurement(id: &'static str, prompt: &'static str, category: MeasurementCategory) -> Self {
        Self {
            unit_category: Some(category),
            ..Self::new(id, prompt, InputKind::NumberWithUnit)
        }
    }

    pub fn scale(id: &'static str, prompt: &'static str, min: i32, max: i32) -> Self {
        Self {
            scale: Some(ScaleRange { min, max }),
            ..Self::new(id, prompt, InputKind::Scale)
        }
    }

    pub fn free_text(id: &'static str, prompt: &'static str) -> Self {
        Self::new(id, prompt, InputKind::FreeText)
    }

    pub fn info(id: &'static str, prompt: &'static str) -> Self {
        Self::new(id, prompt, InputKind::Informational)
    }

    pub fn summary(id: &'static str, prompt: &'static str) -> Self {
        Self::new(id, prompt, InputKind::TerminalSummary)
    }

    pub fn exit(id: &'static str, prompt: &'static str) -> Self {
        Self::new(id, prompt, InputKind::TerminalExit)
    }

    /// Stores the answer under `key` instead of the step id.
    pub fn key(mut self, key: &'static str) -> Self {
        self.storage_key = Some(key);
        self
    }

    pub fn next(mut self, id: &'static str) -> Self {
        self.next = Some(NextStep::Fixed(id));
        self
    }

    pub fn branch(mut self, next: NextStepFn) -> Self {
        self.next = Some(NextStep::Computed(next));
        self
    }

    pub fn validate(mut self, validator: Validator, error_text: &'static str) -> Self {
        self.validator = Some(validator);
        self.error_text = Some(error_text);
        self
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Key the answer is recorded under.
    pub fn answer_key(&self) -> &'static str {
        self.storage_key.unwrap_or(self.id)
    }

    /// Describes how the shell should collect input for this step.
    pub fn to_prompt(&self) -> StepPrompt {
        StepPrompt {
            step_id: self.id,
            text: self.prompt,
            input: InputDescriptor {
                kind: self.kind,
                options: self.options,
                unit_category: self.unit_category,
                scale: self.scale,
                placeholder: self.placeholder,
            },
        }
    }
}

/// Input constraints for the active step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputDescriptor {
    pub kind: InputKind,
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_category: Option<MeasurementCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScaleRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
}

fn no_options(options: &&'static [&'static str]) -> bool {
    options.is_empty()
}

/// A step as presented to the shell: its text and input descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepPrompt {
    pub step_id: &'static str,
    pub text: &'static str,
    pub input: InputDescriptor,
}
