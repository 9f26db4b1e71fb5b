//! Workflow results and reports
//!
//! A [`WorkflowResult`] is the immutable outcome of one run. Every run makes
//! a new one; earlier results for the same claim are kept as history. The
//! [`WorkflowReport`] is the flattened record layout handed to storage and
//! to API callers.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, Money, RecordId, StageId, CapabilityId};
use domain_claims::{
    BalanceStatus, CapabilityStatus, ClaimRecord, ClaimStatus, ConversationLog, Decision,
    DecisionOutcome, DecisionSource, EvidenceKind, FraudIndicator, RiskLevel,
};

use crate::stage::StagePlan;

pub const REPORT_TYPE: &str = "claims_adjudication";

/// Outcome of one adjudication run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub record_id: RecordId,
    pub claim_id: ClaimId,
    /// The claim as it was when the run started
    pub claim: ClaimRecord,
    pub final_status: ClaimStatus,
    pub decision: Decision,
    pub log: Arc<ConversationLog>,
    pub planned_capabilities: usize,
    pub participation_count: usize,
    pub evidence_kinds: Vec<EvidenceKind>,
    pub total_duration_ms: u64,
    pub generated_at: DateTime<Utc>,
}

/// Orchestration block of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationSummary {
    pub total_capabilities: usize,
    pub capabilities_participated: usize,
    pub total_duration_ms: u64,
    pub capabilities: Vec<CapabilityOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityOutcome {
    pub capability_id: CapabilityId,
    pub stage_id: StageId,
    pub status: CapabilityStatus,
    pub duration_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Decision block of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionBlock {
    pub decision: DecisionOutcome,
    pub approved_amount: Money,
    pub fraud_risk_level: RiskLevel,
    pub balance_status: BalanceStatus,
    pub remaining_balance: Money,
    pub policy_utilization_percent: Decimal,
    pub fraud_indicators: Vec<FraudIndicator>,
    pub rationale: String,
    pub decision_source: DecisionSource,
}

impl From<&Decision> for DecisionBlock {
    fn from(decision: &Decision) -> Self {
        Self {
            decision: decision.decision,
            approved_amount: decision.approved_amount,
            fraud_risk_level: decision.fraud_risk_level,
            balance_status: decision.balance_status,
            remaining_balance: decision.remaining_balance,
            policy_utilization_percent: decision.policy_utilization_percent,
            fraud_indicators: decision.fraud_indicators.clone(),
            rationale: decision.rationale.clone(),
            decision_source: decision.decision_source,
        }
    }
}

/// Persisted record layout of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowReport {
    pub report_type: String,
    pub record_id: RecordId,
    pub claim_id: ClaimId,
    pub patient_name: String,
    pub processing_time_ms: u64,
    pub evidence_references: Vec<EvidenceKind>,
    pub orchestration: OrchestrationSummary,
    pub decision: DecisionBlock,
    /// Whether each planned capability produced an artifact
    pub capability_availability: BTreeMap<CapabilityId, bool>,
    pub generated_at: DateTime<Utc>,
}

/// Builds results and their reports
pub struct ReportAssembler;

impl ReportAssembler {
    /// Combines the pieces of a finished run into an immutable result
    pub fn assemble(
        claim: &ClaimRecord,
        evidence_kinds: Vec<EvidenceKind>,
        plan: &StagePlan,
        log: ConversationLog,
        decision: Decision,
        elapsed: Duration,
    ) -> WorkflowResult {
        WorkflowResult {
            record_id: RecordId::new_v7(),
            claim_id: claim.id.clone(),
            claim: claim.clone(),
            final_status: decision.decision.into(),
            participation_count: log.participation_count(),
            planned_capabilities: plan.capability_count(),
            log: Arc::new(log),
            decision,
            evidence_kinds,
            total_duration_ms: elapsed.as_millis() as u64,
            generated_at: Utc::now(),
        }
    }

    pub fn report(result: &WorkflowResult) -> WorkflowReport {
        let capabilities: Vec<CapabilityOutcome> = result
            .log
            .all()
            .iter()
            .map(|entry| CapabilityOutcome {
                capability_id: entry.capability_id.clone(),
                stage_id: entry.stage_id.clone(),
                status: entry.status,
                duration_ms: entry.duration_ms(),
                failure: entry.failure.clone(),
            })
            .collect();

        let mut capability_availability = BTreeMap::new();
        for entry in result.log.all() {
            let available = capability_availability.entry(entry.capability_id.clone()).or_insert(false);
            *available |= entry.is_completed();
        }

        WorkflowReport {
            report_type: REPORT_TYPE.to_string(),
            record_id: result.record_id,
            claim_id: result.claim_id.clone(),
            patient_name: result.claim.patient_name.clone(),
            processing_time_ms: result.total_duration_ms,
            evidence_references: result.evidence_kinds.clone(),
            orchestration: OrchestrationSummary {
                total_capabilities: result.planned_capabilities,
                capabilities_participated: result.participation_count,
                total_duration_ms: result.total_duration_ms,
                capabilities,
            },
            decision: DecisionBlock::from(&result.decision),
            capability_availability,
            generated_at: result.generated_at,
        }
    }

    /// Short human-readable summary for logs and notifications
    pub fn summary_text(result: &WorkflowResult) -> String {
        let decision = &result.decision;
        let mut text = String::new();
        let _ = writeln!(text, "Claim {} ({})", result.claim_id, result.claim.patient_name);
        let _ = writeln!(
            text,
            "Decision: {} | Approved: {} | Fraud risk: {}",
            decision.decision,
            decision.approved_amount.format_grouped(),
            decision.fraud_risk_level
        );
        let _ = writeln!(
            text,
            "Balance: {} remaining, {}% utilized ({})",
            decision.remaining_balance.format_grouped(),
            decision.policy_utilization_percent,
            decision.balance_status
        );
        let _ = writeln!(
            text,
            "Capabilities: {}/{} participated in {}ms",
            result.participation_count, result.planned_capabilities, result.total_duration_ms
        );
        for indicator in &decision.fraud_indicators {
            let _ = writeln!(text, "  ! {}", indicator);
        }
        text
    }
}
