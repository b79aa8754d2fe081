//! Integration tests for the intake interview.
//!
//! These tests drive the real intake flow through the public API:
//! 1. A scripted walk reaches the summary and classifies the measurements
//! 2. Every validated step rejects bad input without touching state
//! 3. Every unvalidated step advances to a defined step on well-typed input
//! 4. "Other" detours resume where the plain answer would have gone
//! 5. Interview state survives a serialization round trip mid-detour

mod common;

use std::sync::Arc;

use intake_sherpa::application::IntakeSession;
use intake_sherpa::domain::classification::{BmiClass, ThresholdGroup, WhtrClass};
use intake_sherpa::domain::flow::intake::{steps, OTHER_MARKER, PRESCRIPTION_MARKER};
use intake_sherpa::domain::flow::{intake_flow, AnswerValue, FlowDefinition, InputKind, Step};
use intake_sherpa::domain::interview::{
    EngineOutput, InterviewEngine, InterviewState, InterviewStatus, PendingClarification,
};

use common::walk;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn flow() -> Arc<FlowDefinition> {
    intake_flow().expect("intake flow is valid")
}

/// Engine resting on `step`, with a pending detour when the step collects
/// clarifications.
fn engine_at(flow: &Arc<FlowDefinition>, step: &Step) -> InterviewEngine {
    let mut state = InterviewState::new(step.id);
    if flow.is_clarification_step(step.id) {
        state.pending_clarification = Some(PendingClarification {
            originating_key: "gender".to_string(),
            resume_step_id: "ethnicity".to_string(),
            deferred_answer: Some(AnswerValue::text(OTHER_MARKER)),
        });
    }
    InterviewEngine::from_state(Arc::clone(flow), state).expect("state is consistent")
}

fn triggers_detour(label: &str) -> bool {
    label.contains(OTHER_MARKER) || label == PRESCRIPTION_MARKER
}

/// Every well-typed answer a step can take, excluding detour triggers.
fn plain_answers(step: &Step) -> Vec<AnswerValue> {
    let labels = step.options.iter().copied().filter(|label| !triggers_detour(label));
    match step.kind {
        InputKind::Choice => labels.map(AnswerValue::text).collect(),
        InputKind::MultiChoice => labels.map(|label| AnswerValue::list([label])).collect(),
        InputKind::Scale => {
            let scale = step.scale.expect("scale step has a range");
            (scale.min..=scale.max).map(|n| AnswerValue::Number(f64::from(n))).collect()
        }
        InputKind::Number | InputKind::NumberWithUnit => vec![AnswerValue::Number(12.0)],
        InputKind::FreeText => vec![AnswerValue::text("Walking the dog")],
        _ => Vec::new(),
    }
}

// =============================================================================
// Full Walk
// =============================================================================

#[test]
fn scripted_walk_reaches_summary() {
    let mut session = IntakeSession::new(flow());

    let (last, _) = walk(&mut session);

    assert_eq!(last.step_id(), steps::GENERATE_REPORT);
    assert!(matches!(last.output, EngineOutput::GeneratePlan { .. }));
    assert_eq!(session.status(), InterviewStatus::ReadyForPlan);
}

#[test]
fn scripted_walk_classifies_measurements() {
    let mut session = IntakeSession::new(flow());
    walk(&mut session);

    let classification = session.engine().classification();

    // 80 kg at 1.75 m, waist 90 cm, "White" uses standard thresholds.
    assert_eq!(classification.threshold_group, ThresholdGroup::Standard);
    assert_eq!(classification.bmi, Some(26.1));
    assert_eq!(classification.bmi_class, Some(BmiClass::Overweight));
    assert_eq!(classification.whtr, Some(0.51));
    assert_eq!(classification.whtr_class, Some(WhtrClass::IncreasedRisk));
}

#[test]
fn informational_steps_are_never_current() {
    let mut session = IntakeSession::new(flow());

    let (last, seen) = walk(&mut session);

    let activity_intro = seen
        .iter()
        .chain(std::iter::once(&last))
        .inspect(|response| {
            assert_ne!(response.output.prompt().input.kind, InputKind::Informational);
        })
        .flat_map(|response| response.notices.iter())
        .count();
    assert_eq!(activity_intro, 1);
}

#[test]
fn underage_answer_ends_without_plan() {
    let mut session = IntakeSession::new(flow());
    session.start().unwrap();
    session.submit_answer("Yes, let's begin").unwrap();

    let response = session.submit_answer("No, I am not").unwrap();

    assert_eq!(response.step_id(), steps::EXIT_UNDERAGE);
    assert!(matches!(response.output, EngineOutput::Finished { .. }));
    assert!(session.plan_ticket().is_err());
}

// =============================================================================
// Step Properties
// =============================================================================

#[test]
fn validated_steps_reject_bad_input_without_state_change() {
    let flow = flow();
    let validated: Vec<&Step> = flow.steps().filter(|step| step.validator.is_some()).collect();
    assert!(validated.len() >= 5);

    for step in validated {
        let mut engine = engine_at(&flow, step);
        let before = engine.state().clone();
        let bad = match step.kind {
            InputKind::FreeText => AnswerValue::text("   "),
            _ => AnswerValue::Number(0.0),
        };

        let response = engine.submit_answer(bad).unwrap();

        match response.output {
            EngineOutput::Rejected { error, prompt } => {
                assert_eq!(Some(error.as_str()), step.error_text, "step {}", step.id);
                assert_eq!(prompt.step_id, step.id);
            }
            other => panic!("step {} accepted invalid input: {:?}", step.id, other),
        }
        assert_eq!(engine.state(), &before, "step {}", step.id);
    }
}

#[test]
fn unvalidated_steps_advance_and_record() {
    let flow = flow();
    let unvalidated = flow.steps().filter(|step| {
        step.validator.is_none() && step.kind.requires_input() && !flow.is_clarification_step(step.id)
    });

    for step in unvalidated {
        for answer in plain_answers(step) {
            let mut engine = engine_at(&flow, step);

            let response = engine.submit_answer(answer.clone()).unwrap();

            assert!(
                flow.step(response.step_id()).is_some(),
                "step {} led to an undefined step",
                step.id
            );
            assert!(!response.output.is_rejected(), "step {} rejected {}", step.id, answer);
            assert_eq!(engine.state().answers.get(step.answer_key()), Some(&answer));
        }
    }
}

#[test]
fn rerecording_overwrites_only_that_key() {
    let flow = flow();
    let mut engine = engine_at(&flow, flow.step("sleep_quality").unwrap());
    engine.submit_answer("Good").unwrap();
    let recorded = engine.state().answers.clone();

    let mut state = engine.into_state();
    state.current_step_id = "sleep_quality".to_string();
    let mut engine = InterviewEngine::from_state(Arc::clone(&flow), state).unwrap();
    engine.submit_answer("Poor").unwrap();

    let answers = &engine.state().answers;
    assert_eq!(answers.text("sleep_quality"), Some("Poor"));
    assert_eq!(answers.len(), recorded.len());
}

// =============================================================================
// Clarification Detours
// =============================================================================

#[test]
fn other_detours_resume_at_the_direct_next_step() {
    let flow = flow();
    let with_other = flow
        .steps()
        .filter(|step| step.options.contains(&OTHER_MARKER))
        .collect::<Vec<_>>();
    assert_eq!(with_other.len(), 3);

    for step in with_other {
        let plain = plain_answers(step).remove(0);
        let direct = engine_at(&flow, step).submit_answer(plain).unwrap();

        let marker = match step.kind {
            InputKind::MultiChoice => AnswerValue::list([OTHER_MARKER]),
            _ => AnswerValue::text(OTHER_MARKER),
        };
        let mut engine = engine_at(&flow, step);
        let detour = engine.submit_answer(marker.clone()).unwrap();

        assert_eq!(detour.step_id(), steps::CLARIFY_OTHER, "step {}", step.id);
        let pending = engine.state().pending_clarification.clone().unwrap();
        assert_eq!(pending.resume_step_id, direct.step_id(), "step {}", step.id);
        assert!(engine.state().answers.get(step.answer_key()).is_none());

        let resumed = engine.submit_clarification("Something else").unwrap();

        assert_eq!(resumed.step_id(), direct.step_id());
        let answers = &engine.state().answers;
        assert_eq!(answers.get(step.answer_key()), Some(&marker));
        assert_eq!(
            answers.text(&format!("{}_other", step.answer_key())),
            Some("Something else")
        );
    }
}

#[test]
fn prescription_detour_records_method_immediately() {
    let flow = flow();
    let mut engine = engine_at(&flow, flow.step("weight_loss_methods").unwrap());

    let detour = engine
        .submit_answer(AnswerValue::list(["Supplements", PRESCRIPTION_MARKER]))
        .unwrap();

    assert_eq!(detour.step_id(), steps::SPECIFY_MEDICATION);
    assert!(engine.state().answers.get("weight_loss_methods").is_some());

    let resumed = engine.submit_clarification("Orlistat").unwrap();

    assert_eq!(resumed.step_id(), "weight_loss_supervision");
    assert_eq!(engine.state().answers.text("weight_loss_meds_specify"), Some("Orlistat"));
}

#[test]
fn state_round_trips_mid_detour() {
    let flow = flow();
    let mut engine = engine_at(&flow, flow.step("gender").unwrap());
    engine.submit_answer(OTHER_MARKER).unwrap();

    let json = serde_json::to_string(engine.state()).unwrap();
    let restored: InterviewState = serde_json::from_str(&json).unwrap();
    assert_eq!(&restored, engine.state());

    let mut engine = InterviewEngine::from_state(Arc::clone(&flow), restored).unwrap();
    let response = engine.submit_clarification("Non-binary").unwrap();

    assert_eq!(response.step_id(), "ethnicity");
    assert_eq!(engine.state().answers.text("gender"), Some(OTHER_MARKER));
    assert_eq!(engine.state().answers.text("gender_other"), Some("Non-binary"));
}
