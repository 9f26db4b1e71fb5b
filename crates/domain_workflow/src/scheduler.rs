//! Stage scheduler
//!
//! Walks a [`StagePlan`] in declared order and records every invocation in
//! the [`ConversationLog`]. The scheduler only fails for structurally invalid
//! input, and only before the first stage runs. Once stages are executing,
//! a failing or slow capability is recorded as a failed result and the run
//! carries on.
//!
//! Each invocation is bounded by the per-capability timeout, and a capability
//! that panics is recorded like one that returned an error. Members of a
//! parallel group all see the log as it stood when the group started; later
//! stages see everything except results from unavailable capabilities.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use tracing::{error, info, info_span, warn, Instrument};

use core_kernel::{CapabilityId, StageId};
use domain_claims::{CapabilityResult, ClaimRecord, ConversationLog, EvidenceBundle};

use crate::capability::{CapabilityError, CapabilityInstructions, CapabilityRegistry, CapabilityRequest};
use crate::error::OrchestrationError;
use crate::stage::{ExecutionMode, StageDefinition, StagePlan};

/// Per-capability timeout used when none is configured
pub const DEFAULT_CAPABILITY_TIMEOUT: Duration = Duration::from_secs(120);

/// Notified each time a result is appended to the log
pub trait RunObserver: Send + Sync {
    fn on_appended(&self, position: usize, result: &CapabilityResult);
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_appended(&self, _position: usize, _result: &CapabilityResult) {}
}

/// Drives capabilities stage by stage
#[derive(Debug, Clone)]
pub struct StageScheduler {
    registry: Arc<CapabilityRegistry>,
    instructions: CapabilityInstructions,
    timeout: Duration,
}

impl StageScheduler {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            instructions: CapabilityInstructions::default(),
            timeout: DEFAULT_CAPABILITY_TIMEOUT,
        }
    }

    pub fn with_instructions(mut self, instructions: CapabilityInstructions) -> Self {
        self.instructions = instructions;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Checks the claim and evidence before anything is invoked
    pub fn validate_inputs(claim: &ClaimRecord, evidence: &EvidenceBundle) -> Result<(), OrchestrationError> {
        claim
            .validate()
            .map_err(|e| OrchestrationError::InvalidClaim(e.to_string()))?;

        let missing = evidence.missing_required();
        if !missing.is_empty() {
            return Err(OrchestrationError::MissingEvidence(missing));
        }
        Ok(())
    }

    /// Runs every stage of `plan` and returns the completed log
    pub async fn run(
        &self,
        claim: &ClaimRecord,
        evidence: &EvidenceBundle,
        plan: &StagePlan,
        observer: &dyn RunObserver,
    ) -> Result<ConversationLog, OrchestrationError> {
        Self::validate_inputs(claim, evidence)?;
        Ok(self.execute(claim, evidence, plan, observer).await)
    }

    /// Runs the plan on inputs that are already validated
    pub async fn execute(
        &self,
        claim: &ClaimRecord,
        evidence: &EvidenceBundle,
        plan: &StagePlan,
        observer: &dyn RunObserver,
    ) -> ConversationLog {
        let mut log = ConversationLog::new();

        for stage in plan.stages() {
            let span = info_span!("stage", claim_id = %claim.id, stage_id = %stage.id);
            let results = self
                .run_stage(stage, claim, evidence, &log)
                .instrument(span)
                .await;

            for result in results {
                match log.append(result) {
                    Ok(position) => {
                        if let Some(appended) = log.get(position) {
                            observer.on_appended(position, appended);
                        }
                    }
                    Err(err) => error!(stage_id = %stage.id, error = %err, "Failed to append result"),
                }
            }
        }

        info!(
            claim_id = %claim.id,
            entries = log.len(),
            participated = log.participation_count(),
            "Run finished"
        );
        log
    }

    async fn run_stage(
        &self,
        stage: &StageDefinition,
        claim: &ClaimRecord,
        evidence: &EvidenceBundle,
        log: &ConversationLog,
    ) -> Vec<CapabilityResult> {
        let prior = log.visible_to_later_stages();

        match stage.mode {
            ExecutionMode::Sequential => {
                info!(capabilities = 1, "Running sequential stage");
                let mut results = Vec::with_capacity(1);
                for capability_id in &stage.capabilities {
                    results.push(self.invoke_one(&stage.id, capability_id, claim, evidence, &prior).await);
                }
                results
            }
            ExecutionMode::ParallelGroup => {
                info!(capabilities = stage.capabilities.len(), "Running parallel stage");
                let invocations = stage
                    .capabilities
                    .iter()
                    .map(|capability_id| self.invoke_one(&stage.id, capability_id, claim, evidence, &prior));
                // join_all yields in input order, which is the declared order
                join_all(invocations).await
            }
        }
    }

    async fn invoke_one(
        &self,
        stage_id: &StageId,
        capability_id: &CapabilityId,
        claim: &ClaimRecord,
        evidence: &EvidenceBundle,
        prior: &[CapabilityResult],
    ) -> CapabilityResult {
        let started_at = Utc::now();
        let request = CapabilityRequest {
            capability_id,
            stage_id,
            claim,
            evidence,
            prior_log: prior,
            instructions: self.instructions.get(capability_id),
            timeout: self.timeout,
        };

        let outcome = match self.registry.get(capability_id) {
            Some(invoker) => {
                let invocation = AssertUnwindSafe(invoker.invoke(request)).catch_unwind();
                match tokio::time::timeout(self.timeout, invocation).await {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(panic)) => Err(CapabilityError::unavailable(
                        capability_id,
                        format!("capability panicked: {}", panic_message(&*panic)),
                    )),
                    Err(_) => Err(CapabilityError::timeout(capability_id, self.timeout)),
                }
            }
            None => Err(CapabilityError::unavailable(capability_id, "no invoker registered")),
        };
        let finished_at = Utc::now();

        match outcome {
            Ok(artifact) => {
                info!(capability_id = %capability_id, chars = artifact.len(), "Capability completed");
                CapabilityResult::completed(
                    capability_id.clone(),
                    stage_id.clone(),
                    artifact,
                    started_at,
                    finished_at,
                )
            }
            Err(err @ CapabilityError::Timeout { .. }) => {
                warn!(capability_id = %capability_id, error = %err, "Capability timed out");
                CapabilityResult::timed_out(
                    capability_id.clone(),
                    stage_id.clone(),
                    err.to_string(),
                    started_at,
                    finished_at,
                )
            }
            Err(err) => {
                warn!(capability_id = %capability_id, error = %err, "Capability failed");
                CapabilityResult::errored(
                    capability_id.clone(),
                    stage_id.clone(),
                    err.to_string(),
                    started_at,
                    finished_at,
                )
            }
        }
    }
}

/// Text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
