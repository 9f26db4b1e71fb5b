//! Claim processing service
//!
//! The caller-facing operations: submit a claim, start processing it, follow
//! the run as a stream of events, and fetch stored results.
//!
//! `start_processing` does all of the checks that can fail (the claim exists,
//! is not already running, has its required evidence) before it returns a
//! session id. The run itself is spawned on a tokio task and always ends in
//! a stored result and a `complete` event. A watcher task awaits the run; if
//! the run task dies, the watcher concludes the session with a Pending
//! fallback result so the stream ends and the claim can be processed again.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use core_kernel::{ClaimId, HealthCheckResult, PortError, SessionId};
use domain_claims::{ClaimRecord, ClaimStatus, ClaimSubmission, EvidenceBundle};

use crate::engine::AdjudicationEngine;
use crate::error::WorkflowError;
use crate::ports::{ClaimRepository, EvidenceCollector, WorkflowResultStore};
use crate::report::{ReportAssembler, WorkflowResult};
use crate::session::{ProcessingEvent, ProcessingSession, SessionRegistry};

/// Returned when a run has been started
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStarted {
    pub session_id: SessionId,
    pub claim_id: ClaimId,
}

/// What an update stream follows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTarget {
    /// The latest run of a claim, live or stored
    Claim(ClaimId),
    /// One specific session
    Session(SessionId),
}

pub struct ClaimProcessingService {
    engine: Arc<AdjudicationEngine>,
    claims: Arc<dyn ClaimRepository>,
    results: Arc<dyn WorkflowResultStore>,
    evidence: Arc<dyn EvidenceCollector>,
    sessions: Arc<SessionRegistry>,
}

impl ClaimProcessingService {
    pub fn new(
        engine: AdjudicationEngine,
        claims: Arc<dyn ClaimRepository>,
        results: Arc<dyn WorkflowResultStore>,
        evidence: Arc<dyn EvidenceCollector>,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            claims,
            results,
            evidence,
            sessions: Arc::new(SessionRegistry::new()),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Accepts a new claim
    #[instrument(skip_all, fields(claim_id = %submission.claim_id))]
    pub async fn submit_claim(&self, submission: ClaimSubmission) -> Result<ClaimRecord, WorkflowError> {
        let claim = ClaimRecord::submit(submission)?;
        self.claims.insert(&claim).await?;
        info!(available_balance = %claim.available_balance, "Claim submitted");
        Ok(claim)
    }

    pub async fn get_claim(&self, claim_id: &ClaimId) -> Result<ClaimRecord, WorkflowError> {
        Ok(self.claims.get(claim_id).await?)
    }

    /// Starts a run for a submitted or previously decided claim
    #[instrument(skip_all, fields(claim_id = %claim_id))]
    pub async fn start_processing(&self, claim_id: &ClaimId) -> Result<ProcessingStarted, WorkflowError> {
        let mut claim = self.claims.get(claim_id).await?;
        if claim.status == ClaimStatus::InProgress {
            return Err(WorkflowError::AlreadyProcessing(claim_id.to_string()));
        }

        let evidence = self.evidence.collect(&claim).await?;
        AdjudicationEngine::validate(&claim, &evidence)?;

        claim.begin_processing()?;
        self.claims.begin_processing(&claim).await.map_err(|err| match err {
            PortError::Conflict { .. } => WorkflowError::AlreadyProcessing(claim_id.to_string()),
            other => other.into(),
        })?;

        let session = self.sessions.open(claim.id.clone()).await;
        let started = ProcessingStarted {
            session_id: session.session_id,
            claim_id: claim.id.clone(),
        };
        info!(session_id = %session.session_id, "Processing started");

        let run = tokio::spawn(run_session(
            Arc::clone(&self.engine),
            Arc::clone(&self.claims),
            Arc::clone(&self.results),
            Arc::clone(&session),
            claim.clone(),
            evidence.clone(),
        ));

        let engine = Arc::clone(&self.engine);
        let claims = Arc::clone(&self.claims);
        let results = Arc::clone(&self.results);
        tokio::spawn(async move {
            let Err(err) = run.await else { return };
            if session.is_finished() {
                warn!(claim_id = %claim.id, error = %err, "Processing task failed after completing");
                return;
            }
            error!(claim_id = %claim.id, session_id = %session.session_id, error = %err, "Processing task failed");
            let result = engine.interrupted_result(&claim, &evidence);
            let finished = AssertUnwindSafe(finish_session(claims, results, &session, claim, &result))
                .catch_unwind()
                .await;
            if finished.is_err() && !session.is_finished() {
                session.complete(&result);
            }
        });

        Ok(started)
    }

    /// Event stream for a claim's latest run or a specific session
    pub async fn stream_updates(
        &self,
        target: &StreamTarget,
    ) -> Result<BoxStream<'static, ProcessingEvent>, WorkflowError> {
        match target {
            StreamTarget::Session(session_id) => self
                .sessions
                .get(session_id)
                .await
                .map(|session| session.subscribe())
                .ok_or_else(|| WorkflowError::SessionNotFound(session_id.to_string())),
            StreamTarget::Claim(claim_id) => {
                if let Some(session) = self.sessions.latest_for_claim(claim_id).await {
                    return Ok(session.subscribe());
                }
                let latest = self.results.get_latest(claim_id).await?;
                Ok(stream::iter(ProcessingEvent::replay(&latest)).boxed())
            }
        }
    }

    pub async fn get_result(&self, claim_id: &ClaimId) -> Result<WorkflowResult, WorkflowError> {
        Ok(self.results.get_latest(claim_id).await?)
    }

    pub async fn get_history(&self, claim_id: &ClaimId) -> Result<Vec<WorkflowResult>, WorkflowError> {
        Ok(self.results.get_history(claim_id).await?)
    }

    pub async fn get_session(&self, session_id: &SessionId) -> Result<Arc<ProcessingSession>, WorkflowError> {
        self.sessions
            .get(session_id)
            .await
            .ok_or_else(|| WorkflowError::SessionNotFound(session_id.to_string()))
    }

    /// Health of the storage adapters
    pub async fn readiness(&self) -> Vec<HealthCheckResult> {
        vec![
            self.claims.health_check().await,
            self.results.health_check().await,
        ]
    }
}

async fn run_session(
    engine: Arc<AdjudicationEngine>,
    claims: Arc<dyn ClaimRepository>,
    results: Arc<dyn WorkflowResultStore>,
    session: Arc<ProcessingSession>,
    claim: ClaimRecord,
    evidence: EvidenceBundle,
) {
    let result = engine
        .adjudicate_validated(&claim, &evidence, session.as_ref())
        .await;

    info!(summary = %ReportAssembler::summary_text(&result), "Workflow result assembled");
    finish_session(claims, results, &session, claim, &result).await;
}

/// Stores the result, settles the claim status and ends the event stream
async fn finish_session(
    claims: Arc<dyn ClaimRepository>,
    results: Arc<dyn WorkflowResultStore>,
    session: &ProcessingSession,
    mut claim: ClaimRecord,
    result: &WorkflowResult,
) {
    if let Err(err) = results.store(result).await {
        warn!(claim_id = %claim.id, record_id = %result.record_id, error = %err, "Failed to store workflow result");
    }

    match claim.complete_with(result.decision.decision) {
        Ok(()) => {
            if let Err(err) = claims.update(&claim).await {
                warn!(claim_id = %claim.id, error = %err, "Failed to update claim status");
            }
        }
        Err(err) => warn!(claim_id = %claim.id, error = %err, "Claim status not updated"),
    }

    session.complete(result);
}
