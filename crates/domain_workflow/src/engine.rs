//! Adjudication engine
//!
//! One run: schedule the capabilities, extract the decision from their
//! conversation, reconcile it against the policy and assemble the result.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};

use domain_claims::{ClaimRecord, ConversationLog, DecisionExtractor, EvidenceBundle, FinancialCalculator};

use crate::capability::CapabilityRegistry;
use crate::error::OrchestrationError;
use crate::report::{ReportAssembler, WorkflowResult};
use crate::scheduler::{RunObserver, StageScheduler};
use crate::stage::StagePlan;

#[derive(Debug, Clone)]
pub struct AdjudicationEngine {
    scheduler: StageScheduler,
    plan: StagePlan,
}

impl AdjudicationEngine {
    pub fn new(scheduler: StageScheduler, plan: StagePlan) -> Self {
        Self { scheduler, plan }
    }

    /// Engine with the default timeout and no instructions
    pub fn with_registry(registry: CapabilityRegistry, plan: StagePlan) -> Self {
        Self::new(StageScheduler::new(Arc::new(registry)), plan)
    }

    pub fn plan(&self) -> &StagePlan {
        &self.plan
    }

    /// Rejects input the engine cannot run on
    pub fn validate(claim: &ClaimRecord, evidence: &EvidenceBundle) -> Result<(), OrchestrationError> {
        StageScheduler::validate_inputs(claim, evidence)
    }

    /// Adjudicates a claim; once validation passes this always yields a result
    pub async fn adjudicate(
        &self,
        claim: &ClaimRecord,
        evidence: &EvidenceBundle,
        observer: &dyn RunObserver,
    ) -> Result<WorkflowResult, OrchestrationError> {
        Self::validate(claim, evidence)?;
        Ok(self.adjudicate_validated(claim, evidence, observer).await)
    }

    /// Adjudicates inputs that already passed [`Self::validate`]
    #[instrument(skip_all, fields(claim_id = %claim.id))]
    pub async fn adjudicate_validated(
        &self,
        claim: &ClaimRecord,
        evidence: &EvidenceBundle,
        observer: &dyn RunObserver,
    ) -> WorkflowResult {
        let started = Instant::now();
        let log = self.scheduler.execute(claim, evidence, &self.plan, observer).await;
        let result = self.conclude(claim, evidence, log, started);

        info!(
            record_id = %result.record_id,
            decision = %result.decision.decision,
            approved = %result.decision.approved_amount,
            source = ?result.decision.decision_source,
            "Adjudication complete"
        );
        result
    }

    /// Result for a run that died before it could finish
    ///
    /// Nothing from the interrupted run is trusted, so the decision comes
    /// from an empty log: Pending, with every field defaulted.
    pub fn interrupted_result(&self, claim: &ClaimRecord, evidence: &EvidenceBundle) -> WorkflowResult {
        self.conclude(claim, evidence, ConversationLog::new(), Instant::now())
    }

    fn conclude(
        &self,
        claim: &ClaimRecord,
        evidence: &EvidenceBundle,
        log: ConversationLog,
        started: Instant,
    ) -> WorkflowResult {
        let extracted = DecisionExtractor::extract(&log, claim);
        let decision = FinancialCalculator::reconcile(claim, extracted);
        ReportAssembler::assemble(claim, evidence.kinds(), &self.plan, log, decision, started.elapsed())
    }
}
