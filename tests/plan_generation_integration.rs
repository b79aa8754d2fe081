//! Integration tests for plan generation.
//!
//! These tests verify the end-to-end flow:
//! 1. A scripted interview reaches the summary
//! 2. The session issues a ticket and the client sends one request
//! 3. The response (or its failure) becomes the session's plan
//!
//! Uses the mock provider so no generation service is contacted.

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures::future::Aborted;
use serde_json::json;

use intake_sherpa::adapters::ai::MockAIProvider;
use intake_sherpa::application::{IntakeSession, PlanGenerationClient, SessionError};
use intake_sherpa::domain::flow::intake_flow;
use intake_sherpa::domain::plan::{PlanOrigin, NOT_PROVIDED, PLAN_FIELDS};
use intake_sherpa::ports::AIError;

use common::walk;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn plan_payload() -> String {
    json!({
        "assessmentSummary": "Your BMI of 26.1 sits in the overweight range.",
        "healthyEating": "Keep breakfast, add vegetables to lunch.",
        "physicalActivity": "Walk briskly for 30 minutes on five days.",
        "behaviorAndMindset": "Stress is high; a wind-down routine may help.",
        "treatmentConsiderations": "Medication is not indicated at this BMI."
    })
    .to_string()
}

fn session_at_summary() -> IntakeSession {
    let mut session = IntakeSession::new(intake_flow().unwrap());
    walk(&mut session);
    session
}

fn client(provider: &MockAIProvider) -> PlanGenerationClient {
    PlanGenerationClient::new(Arc::new(provider.clone()))
}

// =============================================================================
// Generated Plans
// =============================================================================

#[tokio::test]
async fn interview_produces_generated_plan() {
    let provider = MockAIProvider::new().with_response(plan_payload());
    let mut session = session_at_summary();

    let plan = session.generate_plan(&client(&provider)).await.unwrap();

    assert_eq!(plan.origin, PlanOrigin::Generated);
    assert_eq!(plan.sections.healthy_eating, "Keep breakfast, add vegetables to lunch.");
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn request_carries_summary_and_schema() {
    let provider = MockAIProvider::new().with_response(plan_payload());
    let mut session = session_at_summary();

    session.generate_plan(&client(&provider)).await.unwrap();

    let request = &provider.get_calls()[0];
    let prompt = &request.messages[0].content;
    assert!(prompt.contains("BMI: 26.1"));
    assert!(prompt.contains("BMI Class: Overweight"));
    assert!(prompt.contains("Waist-to-Height Ratio: 0.51"));
    assert!(prompt.contains(&format!("Gender (specified): {}", NOT_PROVIDED)));
    assert_eq!(request.metadata.interview_id, session.interview_id());

    let schema = request.response_schema.as_ref().unwrap();
    for field in PLAN_FIELDS {
        assert_eq!(schema["properties"][field]["type"], "string");
    }
}

#[tokio::test]
async fn fenced_payload_is_accepted() {
    let provider =
        MockAIProvider::new().with_response(format!("```json\n{}\n```", plan_payload()));
    let mut session = session_at_summary();

    let plan = session.generate_plan(&client(&provider)).await.unwrap();

    assert!(!plan.is_fallback());
}

// =============================================================================
// Fallback
// =============================================================================

#[tokio::test]
async fn transport_failure_yields_fallback_plan() {
    let provider = MockAIProvider::new().with_error(AIError::network("connection refused"));
    let mut session = session_at_summary();

    let plan = session.generate_plan(&client(&provider)).await.unwrap();

    assert!(plan.is_fallback());
    for (title, text) in plan.titled_sections() {
        assert!(!text.trim().is_empty(), "{} is blank", title);
    }
    assert!(plan.sections.treatment_considerations.contains("healthcare provider"));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn blank_field_yields_fallback_plan() {
    let mut payload: serde_json::Value = serde_json::from_str(&plan_payload()).unwrap();
    payload["physicalActivity"] = json!("  ");
    let provider = MockAIProvider::new().with_response(payload.to_string());
    let mut session = session_at_summary();

    let plan = session.generate_plan(&client(&provider)).await.unwrap();

    assert!(plan.is_fallback());
}

#[tokio::test]
async fn status_errors_yield_fallback_plan() {
    let errors = [
        AIError::AuthenticationFailed,
        AIError::rate_limited(30),
        AIError::unavailable("Server error 503"),
        AIError::Timeout { timeout_secs: 60 },
    ];

    for error in errors {
        let provider = MockAIProvider::new().with_error(error.clone());
        let mut session = session_at_summary();

        let plan = session.generate_plan(&client(&provider)).await.unwrap();

        assert!(plan.is_fallback(), "{} did not fall back", error);
    }
}

// =============================================================================
// Cancellation and Stale Results
// =============================================================================

#[tokio::test]
async fn abandoned_request_leaves_no_plan() {
    let provider = MockAIProvider::new()
        .with_response(plan_payload())
        .with_delay(Duration::from_secs(5));
    let session = session_at_summary();
    let ticket = session.plan_ticket().unwrap();

    let (request, handle) = client(&provider).generate_plan_abortable(
        ticket.interview_id,
        ticket.answers.clone(),
        ticket.classification,
    );
    let task = tokio::spawn(request);
    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.abort();

    assert_eq!(task.await.unwrap().err(), Some(Aborted));
    assert!(session.plan().is_none());
}

#[tokio::test]
async fn late_plan_after_restart_is_discarded() {
    let provider = MockAIProvider::new()
        .with_response(plan_payload())
        .with_delay(Duration::from_millis(30));
    let mut session = session_at_summary();
    let ticket = session.plan_ticket().unwrap();

    let (request, _handle) = client(&provider).generate_plan_abortable(
        ticket.interview_id,
        ticket.answers.clone(),
        ticket.classification,
    );
    let task = tokio::spawn(request);
    session.restart().unwrap();
    let plan = task.await.unwrap().unwrap();

    assert_eq!(session.accept_plan(&ticket, plan).err(), Some(SessionError::StalePlan));
    assert!(session.plan().is_none());
}
