//! Scripted answers for walking the intake flow end to end.

#![allow(dead_code)]

use intake_sherpa::application::IntakeSession;
use intake_sherpa::domain::flow::{AnswerValue, InputKind, StepPrompt};
use intake_sherpa::domain::interview::{EngineOutput, EngineResponse};

/// Upper bound on prompts in one walk; the intake flow has far fewer.
pub const MAX_PROMPTS: usize = 200;

/// A valid answer for any interactive prompt of the intake flow.
///
/// Measurements describe an 80 kg, 175 cm adult with a 90 cm waist.
pub fn scripted_answer(prompt: &StepPrompt) -> AnswerValue {
    let options = prompt.input.options;
    match prompt.step_id {
        "age" => AnswerValue::Number(40.0),
        "weight" => AnswerValue::Number(80.0),
        "height" => AnswerValue::Number(175.0),
        "waist" => AnswerValue::Number(90.0),
        _ => match prompt.input.kind {
            InputKind::Choice => AnswerValue::text(options[0]),
            InputKind::MultiChoice => AnswerValue::list([options[0]]),
            InputKind::Scale => {
                let scale = prompt.input.scale.expect("scale step has a range");
                AnswerValue::Number(f64::from(scale.max))
            }
            InputKind::Number | InputKind::NumberWithUnit => AnswerValue::Number(5.0),
            InputKind::FreeText => AnswerValue::text("Nothing unusual"),
            kind => panic!("step {} of kind {:?} takes no input", prompt.step_id, kind),
        },
    }
}

/// Answers every prompt with [`scripted_answer`] until the interview ends.
///
/// Returns the final response and every response seen on the way.
pub fn walk(session: &mut IntakeSession) -> (EngineResponse, Vec<EngineResponse>) {
    let mut seen = Vec::new();
    let mut response = session.start().expect("interview starts");

    for _ in 0..MAX_PROMPTS {
        let answer = match &response.output {
            EngineOutput::GeneratePlan { .. } | EngineOutput::Finished { .. } => {
                return (response, seen);
            }
            EngineOutput::Rejected { error, prompt } => {
                panic!("scripted answer rejected at {}: {}", prompt.step_id, error)
            }
            EngineOutput::AwaitingInput { prompt } => scripted_answer(prompt),
        };
        let next = session.submit_answer(answer).expect("well-typed answer");
        seen.push(std::mem::replace(&mut response, next));
    }

    panic!("interview did not end within {} prompts", MAX_PROMPTS)
}
