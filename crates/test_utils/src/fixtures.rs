//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the adjudicator. The claim figures
//! match the reference scenario: a 75,000 claim on a 500,000 policy with
//! 450,000 still available.

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::{CapabilityId, ClaimId, Currency, Money, StageId};
use domain_claims::{
    BalanceStatus, CapabilityResult, ClaimRecord, ClaimStatus, ClaimSubmission, ConversationLog,
    Decision, DecisionOutcome, DecisionSource, EvidenceBundle, EvidenceKind, RiskLevel,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// An amount in rupees
    pub fn inr(amount: Decimal) -> Money {
        Money::new(amount, Currency::INR)
    }

    pub fn coverage_limit() -> Money {
        Self::inr(dec!(500000))
    }
}

/// Fixture for identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn claim_id() -> ClaimId {
        ClaimId::new("CLM001-2024-LAKSHMI").unwrap()
    }

    pub fn capability(id: &str) -> CapabilityId {
        CapabilityId::new(id).unwrap()
    }

    pub fn stage(id: &str) -> StageId {
        StageId::new(id).unwrap()
    }
}

/// Fixture for claims
pub struct ClaimFixtures;

impl ClaimFixtures {
    /// Submission for the reference scenario, balance given explicitly
    pub fn submission() -> ClaimSubmission {
        ClaimSubmission {
            claim_id: IdFixtures::claim_id(),
            patient_name: "Lakshmi Menon".to_string(),
            policy_number: "POL-88-1200".to_string(),
            claim_amount: MoneyFixtures::inr(dec!(75000)),
            claim_date: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
            diagnosis: "Displaced distal radius fracture".to_string(),
            treatment_type: "Open reduction internal fixation".to_string(),
            hospital: "City General Hospital".to_string(),
            documents_available: ["discharge_summary", "final_bill", "xray_report"]
                .into_iter()
                .map(String::from)
                .collect(),
            policy_coverage_limit: MoneyFixtures::coverage_limit(),
            previously_claimed_amount: MoneyFixtures::inr(dec!(0)),
            available_balance: Some(MoneyFixtures::inr(dec!(450000))),
            policy_year: "2024".to_string(),
        }
    }

    /// The reference scenario claim, status `Submitted`
    pub fn scenario_a() -> ClaimRecord {
        let submitted_at = Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap();
        let submission = Self::submission();
        ClaimRecord {
            id: submission.claim_id,
            patient_name: submission.patient_name,
            policy_number: submission.policy_number,
            claim_amount: submission.claim_amount,
            claim_date: submission.claim_date,
            diagnosis: submission.diagnosis,
            treatment_type: submission.treatment_type,
            hospital: submission.hospital,
            documents_available: submission.documents_available,
            policy_coverage_limit: submission.policy_coverage_limit,
            previously_claimed_amount: submission.previously_claimed_amount,
            available_balance: MoneyFixtures::inr(dec!(450000)),
            policy_year: submission.policy_year,
            status: ClaimStatus::Submitted,
            submitted_at,
            updated_at: submitted_at,
        }
    }
}

/// Shorthand for [`ClaimFixtures::scenario_a`]
pub fn scenario_claim() -> ClaimRecord {
    ClaimFixtures::scenario_a()
}

/// Fixture for evidence bundles
pub struct EvidenceFixtures;

impl EvidenceFixtures {
    /// All five kinds, consistent with the reference claim
    pub fn complete() -> EvidenceBundle {
        EvidenceBundle::new()
            .with(EvidenceKind::Medical, "Discharge summary: displaced distal radius fracture, ORIF performed.")
            .with(EvidenceKind::Billing, "Final bill: surgery 52,000; implants 15,500; room 7,500. Total 75,000.")
            .with(EvidenceKind::Imaging, "X-ray left wrist: displaced distal radius fracture.")
            .with(EvidenceKind::Policy, "Policy POL-88-1200 active, coverage limit 500,000.")
            .with(EvidenceKind::Lab, "CBC within normal limits.")
    }

    /// The complete bundle with one kind removed
    pub fn without(kind: EvidenceKind) -> EvidenceBundle {
        Self::complete()
            .iter()
            .filter(|(k, _)| *k != kind)
            .map(|(k, text)| (k, text.to_string()))
            .collect()
    }
}

/// Canned capability output
pub struct TextFixtures;

impl TextFixtures {
    pub const APPROVED_COORDINATOR: &'static str = "\
**FRAUD_RISK:** LOW
**FINAL DECISION:** APPROVED
**FINAL APPROVED AMOUNT:** ₹72,500
**POLICY BALANCE STATUS:** SUFFICIENT

**Rationale:**
Treatment is consistent with the imaging and the discharge summary.";

    pub const REJECTED_COORDINATOR: &'static str = "\
**FRAUD_RISK:** HIGH
**FINAL DECISION:** REJECTED
**FINAL APPROVED AMOUNT:** ₹0
**POLICY BALANCE STATUS:** SUFFICIENT

**Rationale:**
Imaging does not support the billed procedure.";

    pub const UNSTRUCTURED: &'static str = "The documents look broadly consistent to me.";
}

/// Fixture for conversation logs
pub struct LogFixtures;

impl LogFixtures {
    /// A log of completed results, one per `(capability, artifact)` pair
    pub fn completed(entries: &[(&str, &str)]) -> ConversationLog {
        let mut log = ConversationLog::new();
        let at = Utc.with_ymd_and_hms(2024, 3, 14, 10, 0, 0).unwrap();
        for (capability, artifact) in entries {
            log.append(CapabilityResult::completed(
                IdFixtures::capability(capability),
                IdFixtures::stage("review"),
                *artifact,
                at,
                at,
            ))
            .unwrap();
        }
        log
    }
}

/// Shorthand for [`LogFixtures::completed`]
pub fn log_of(entries: &[(&str, &str)]) -> ConversationLog {
    LogFixtures::completed(entries)
}

/// Fixture for decisions
pub struct DecisionFixtures;

impl DecisionFixtures {
    /// A decision as the extractor would produce it, before reconciliation
    pub fn extracted(claim: &ClaimRecord, outcome: DecisionOutcome, amount: Decimal) -> Decision {
        Decision {
            decision: outcome,
            approved_amount: Money::new(amount, claim.currency()),
            fraud_risk_level: RiskLevel::Low,
            balance_status: BalanceStatus::Sufficient,
            remaining_balance: claim.available_balance,
            policy_utilization_percent: Decimal::ZERO,
            fraud_indicators: Vec::new(),
            rationale: "Documents are consistent".to_string(),
            decision_source: DecisionSource::AgentDerived,
            defaulted_fields: Vec::new(),
        }
    }
}

/// Shorthand for [`DecisionFixtures::extracted`]
pub fn extracted_decision(claim: &ClaimRecord, outcome: DecisionOutcome, amount: Decimal) -> Decision {
    DecisionFixtures::extracted(claim, outcome, amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_claim_matches_submission() {
        let submitted = ClaimRecord::submit(ClaimFixtures::submission()).unwrap();
        let fixture = ClaimFixtures::scenario_a();
        assert_eq!(submitted.id, fixture.id);
        assert_eq!(submitted.available_balance, fixture.available_balance);
    }

    #[test]
    fn test_evidence_without_kind() {
        let bundle = EvidenceFixtures::without(EvidenceKind::Billing);
        assert_eq!(bundle.len(), 4);
        assert!(!bundle.contains(EvidenceKind::Billing));
    }
}
