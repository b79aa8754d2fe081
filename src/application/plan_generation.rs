//! PlanGenerationClient - turns a finished interview into a Plan.
//!
//! One request per call and no retries. Any failure (transport, status,
//! malformed or incomplete payload) yields the fallback plan, so callers
//! always receive a well-formed `Plan`.

use std::sync::Arc;

use futures::future::{abortable, AbortHandle, Abortable, BoxFuture, FutureExt};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::classification::ClassificationResult;
use crate::domain::flow::Answers;
use crate::domain::foundation::InterviewId;
use crate::domain::plan::{plan_prompt, plan_response_schema, PatientSummary, Plan, PlanError, PlanSections};
use crate::ports::{AIError, AIProvider, CompletionRequest, MessageRole, RequestMetadata};

/// Upper bound on generated tokens per plan.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Sampling temperature used when none is configured.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Why a generation attempt did not produce a plan.
#[derive(Debug, Clone, PartialEq, Error)]
enum GenerationFailure {
    #[error("AI provider error: {0}")]
    Provider(#[from] AIError),

    #[error("unusable plan payload: {0}")]
    Payload(#[from] PlanError),
}

/// Client for the external plan generator.
///
/// Credentials and endpoint live in the injected provider; this client
/// only shapes the request and interprets the result.
#[derive(Clone)]
pub struct PlanGenerationClient {
    provider: Arc<dyn AIProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl PlanGenerationClient {
    /// Creates a client around the given provider.
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the maximum number of generated tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Builds the single completion request for an interview.
    pub fn build_request(
        &self,
        interview_id: InterviewId,
        answers: &Answers,
        classification: &ClassificationResult,
    ) -> CompletionRequest {
        let summary = PatientSummary::build(answers, classification);

        CompletionRequest::new(RequestMetadata::new(interview_id, Uuid::new_v4().to_string()))
            .with_message(MessageRole::User, plan_prompt(&summary))
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
            .with_response_schema(plan_response_schema())
    }

    /// Generates a plan. Never fails; falls back on any error.
    pub async fn generate_plan(
        &self,
        interview_id: InterviewId,
        answers: &Answers,
        classification: &ClassificationResult,
    ) -> Plan {
        let request = self.build_request(interview_id, answers, classification);
        let provider = self.provider.provider_info();
        info!(
            interview_id = %interview_id,
            provider = %provider.name,
            model = %provider.model,
            "generating plan"
        );

        match self.try_generate(request).await {
            Ok(sections) => {
                info!(interview_id = %interview_id, "plan generated");
                Plan::generated(sections)
            }
            Err(failure) => {
                let transient = matches!(&failure, GenerationFailure::Provider(e) if e.is_transient());
                warn!(
                    interview_id = %interview_id,
                    error = %failure,
                    transient,
                    "plan generation failed, using fallback plan"
                );
                Plan::fallback()
            }
        }
    }

    /// Same as [`generate_plan`](Self::generate_plan), but returns a handle
    /// that abandons the in-flight request when aborted.
    ///
    /// The returned future owns its inputs so the caller may keep mutating
    /// the interview while the request runs.
    pub fn generate_plan_abortable(
        &self,
        interview_id: InterviewId,
        answers: Answers,
        classification: ClassificationResult,
    ) -> (Abortable<BoxFuture<'static, Plan>>, AbortHandle) {
        let client = self.clone();
        let task = async move {
            client
                .generate_plan(interview_id, &answers, &classification)
                .await
        }
        .boxed();

        abortable(task)
    }

    async fn try_generate(&self, request: CompletionRequest) -> Result<PlanSections, GenerationFailure> {
        let response = self.provider.complete(request).await?;
        debug!(
            model = %response.model,
            finish_reason = ?response.finish_reason,
            total_tokens = response.usage.total_tokens,
            "plan completion received"
        );

        Ok(PlanSections::parse(&response.content)?)
    }
}

impl std::fmt::Debug for PlanGenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanGenerationClient")
            .field("provider", &self.provider.provider_info().name)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::domain::flow::intake::keys;
    use crate::domain::flow::AnswerValue;
    use crate::domain::plan::PLAN_FIELDS;
    use futures::future::Aborted;
    use std::time::Duration;

    const PLAN_JSON: &str = r#"{
        "assessmentSummary": "Your BMI places you in the overweight range.",
        "healthyEating": "Swap the pastry at breakfast for porridge.",
        "physicalActivity": "Brisk walking suits your schedule.",
        "behaviorAndMindset": "Protect your sleep on work nights.",
        "treatmentConsiderations": "Medication is not indicated at this BMI."
    }"#;

    fn answers() -> Answers {
        Answers::new()
            .with(keys::AGE, AnswerValue::Number(42.0))
            .with(keys::GENDER, "Female")
    }

    fn client(provider: MockAIProvider) -> PlanGenerationClient {
        PlanGenerationClient::new(Arc::new(provider))
    }

    fn classification() -> ClassificationResult {
        ClassificationResult::classify(&Default::default())
    }

    mod request {
        use super::*;

        #[test]
        fn carries_schema_and_limits() {
            let client = client(MockAIProvider::new()).with_temperature(0.2);
            let id = InterviewId::new();

            let request = client.build_request(id, &answers(), &classification());

            assert_eq!(request.max_tokens, Some(DEFAULT_MAX_TOKENS));
            assert_eq!(request.temperature, Some(0.2));
            assert_eq!(request.metadata.interview_id, id);
            let schema = request.response_schema.unwrap();
            assert_eq!(schema["required"].as_array().unwrap().len(), PLAN_FIELDS.len());
        }

        #[test]
        fn prompt_is_a_single_user_message() {
            let request =
                client(MockAIProvider::new()).build_request(InterviewId::new(), &answers(), &classification());

            assert_eq!(request.messages.len(), 1);
            assert_eq!(request.messages[0].role, MessageRole::User);
            assert!(request.messages[0].content.contains("Age: 42"));
            assert!(request.messages[0].content.contains("NG246"));
        }
    }

    mod generation {
        use super::*;

        #[tokio::test]
        async fn valid_payload_becomes_generated_plan() {
            let provider = MockAIProvider::new().with_response(PLAN_JSON);
            let client = client(provider.clone());

            let plan = client
                .generate_plan(InterviewId::new(), &answers(), &classification())
                .await;

            assert!(!plan.is_fallback());
            assert_eq!(plan.sections.healthy_eating, "Swap the pastry at breakfast for porridge.");
            assert_eq!(provider.call_count(), 1);
        }

        #[tokio::test]
        async fn transport_failure_falls_back_without_retry() {
            let provider = MockAIProvider::new()
                .with_error(AIError::network("connection reset"))
                .with_response(PLAN_JSON);
            let client = client(provider.clone());

            let plan = client
                .generate_plan(InterviewId::new(), &answers(), &classification())
                .await;

            assert!(plan.is_fallback());
            assert_eq!(provider.call_count(), 1);
        }

        #[tokio::test]
        async fn malformed_payload_falls_back() {
            let client = client(MockAIProvider::new().with_response("Here is your plan!"));

            let plan = client
                .generate_plan(InterviewId::new(), &answers(), &classification())
                .await;

            assert!(plan.is_fallback());
        }

        #[tokio::test]
        async fn missing_field_falls_back() {
            let client = client(
                MockAIProvider::new().with_response(r#"{"assessmentSummary": "Only this"}"#),
            );

            let plan = client
                .generate_plan(InterviewId::new(), &answers(), &classification())
                .await;

            assert!(plan.is_fallback());
            assert!(plan
                .sections
                .treatment_considerations
                .contains("couldn't generate a fully personalized"));
        }

        #[tokio::test]
        async fn identical_inputs_yield_distinct_instances() {
            let client = client(
                MockAIProvider::new()
                    .with_response(PLAN_JSON)
                    .with_response(PLAN_JSON),
            );
            let id = InterviewId::new();

            let first = client.generate_plan(id, &answers(), &classification()).await;
            tokio::time::sleep(Duration::from_millis(2)).await;
            let second = client.generate_plan(id, &answers(), &classification()).await;

            assert_eq!(first.sections, second.sections);
            assert_ne!(first.generated_at, second.generated_at);
        }
    }

    mod abort {
        use super::*;

        #[tokio::test]
        async fn aborted_request_resolves_to_aborted() {
            let provider = MockAIProvider::new()
                .with_response(PLAN_JSON)
                .with_delay(Duration::from_secs(5));
            let client = client(provider);

            let (future, handle) =
                client.generate_plan_abortable(InterviewId::new(), answers(), classification());
            let task = tokio::spawn(future);
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.abort();

            assert_eq!(task.await.unwrap(), Err(Aborted));
        }

        #[tokio::test]
        async fn unaborted_request_completes() {
            let client = client(MockAIProvider::new().with_response(PLAN_JSON));

            let (future, _handle) =
                client.generate_plan_abortable(InterviewId::new(), answers(), classification());

            let plan = future.await.unwrap();
            assert!(!plan.is_fallback());
        }
    }
}
