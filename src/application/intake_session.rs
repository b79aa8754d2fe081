//! IntakeSession - one interview bound to its plan.
//!
//! A plan result is keyed to the interview id and a plan epoch. Restarting
//! bumps the epoch, so a plan requested before the restart is discarded
//! when it arrives.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::classification::{ClassificationResult, MeasurementCategory, Unit};
use crate::domain::flow::{AnswerValue, Answers, FlowDefinition};
use crate::domain::foundation::InterviewId;
use crate::domain::interview::{
    EngineResponse, InterviewEngine, InterviewError, InterviewState, InterviewStatus,
};
use crate::domain::plan::Plan;

use super::plan_generation::PlanGenerationClient;

/// Snapshot handed out when the interview reaches its summary.
///
/// Carries everything plan generation needs, so the request can run while
/// the session keeps changing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanTicket {
    pub interview_id: InterviewId,
    pub epoch: u64,
    pub answers: Answers,
    pub classification: ClassificationResult,
}

/// Errors from session-level operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Interview(#[from] InterviewError),

    #[error("plan requested while interview is {0:?}")]
    NotReadyForPlan(InterviewStatus),

    #[error("plan result belongs to a previous interview")]
    StalePlan,
}

/// Owns one interview engine and the plan produced for it.
#[derive(Debug, Clone)]
pub struct IntakeSession {
    interview_id: InterviewId,
    engine: InterviewEngine,
    epoch: u64,
    plan: Option<Plan>,
}

impl IntakeSession {
    /// Creates a session for a fresh interview.
    pub fn new(flow: Arc<FlowDefinition>) -> Self {
        Self {
            interview_id: InterviewId::new(),
            engine: InterviewEngine::new(flow),
            epoch: 0,
            plan: None,
        }
    }

    /// Restores a session from persisted interview state.
    pub fn resume(
        flow: Arc<FlowDefinition>,
        interview_id: InterviewId,
        state: InterviewState,
    ) -> Result<Self, SessionError> {
        let engine = InterviewEngine::from_state(flow, state)?;
        info!(interview_id = %interview_id, step = %engine.state().current_step_id, "interview resumed");
        Ok(Self {
            interview_id,
            engine,
            epoch: 0,
            plan: None,
        })
    }

    pub fn interview_id(&self) -> InterviewId {
        self.interview_id
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn engine(&self) -> &InterviewEngine {
        &self.engine
    }

    pub fn status(&self) -> InterviewStatus {
        self.engine.status()
    }

    /// The accepted plan, if any.
    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn start(&mut self) -> Result<EngineResponse, InterviewError> {
        self.engine.start()
    }

    pub fn submit_answer(&mut self, answer: impl Into<AnswerValue>) -> Result<EngineResponse, InterviewError> {
        self.engine.submit_answer(answer)
    }

    pub fn submit_clarification(&mut self, text: impl Into<String>) -> Result<EngineResponse, InterviewError> {
        self.engine.submit_clarification(text)
    }

    pub fn set_unit(&mut self, category: MeasurementCategory, unit: Unit) -> Result<(), InterviewError> {
        self.engine.set_unit(category, unit)
    }

    /// Begins a new interview, invalidating any plan still in flight.
    pub fn restart(&mut self) -> Result<EngineResponse, InterviewError> {
        self.interview_id = InterviewId::new();
        self.epoch += 1;
        self.plan = None;
        info!(interview_id = %self.interview_id, epoch = self.epoch, "interview restarted");
        self.engine.start()
    }

    /// Issues a ticket for plan generation. Only available at the summary.
    pub fn plan_ticket(&self) -> Result<PlanTicket, SessionError> {
        match self.status() {
            InterviewStatus::ReadyForPlan => Ok(PlanTicket {
                interview_id: self.interview_id,
                epoch: self.epoch,
                answers: self.engine.state().answers.clone(),
                classification: self.engine.classification(),
            }),
            status => Err(SessionError::NotReadyForPlan(status)),
        }
    }

    /// Stores a plan if its ticket still matches this interview.
    pub fn accept_plan(&mut self, ticket: &PlanTicket, plan: Plan) -> Result<&Plan, SessionError> {
        let current = ticket.interview_id == self.interview_id && ticket.epoch == self.epoch;
        if !current || self.status() != InterviewStatus::ReadyForPlan {
            warn!(
                interview_id = %ticket.interview_id,
                epoch = ticket.epoch,
                "discarding stale plan"
            );
            return Err(SessionError::StalePlan);
        }

        debug!(interview_id = %self.interview_id, origin = ?plan.origin, "plan accepted");
        let plan: &Plan = self.plan.insert(plan);
        Ok(plan)
    }

    /// Requests a plan and stores it. Always yields a plan when the
    /// interview is at the summary; generation failures become the
    /// fallback plan.
    pub async fn generate_plan(&mut self, client: &PlanGenerationClient) -> Result<&Plan, SessionError> {
        let ticket = self.plan_ticket()?;
        let plan = client
            .generate_plan(ticket.interview_id, &ticket.answers, &ticket.classification)
            .await;
        self.accept_plan(&ticket, plan)
    }
}
