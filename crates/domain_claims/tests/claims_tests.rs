//! Comprehensive tests for domain_claims

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CapabilityId, StageId};
use domain_claims::{
    BalanceStatus, CapabilityResult, ClaimRecord, ClaimStatus, ClaimSubmission, ConversationLog,
    DecisionExtractor, DecisionField, DecisionOutcome, DecisionSource, FinancialCalculator,
    IndicatorCategory, RiskLevel, Severity,
};
use test_utils::{
    assert_decision_invariants, extracted_decision, log_of, scenario_claim, ClaimRecordBuilder,
};

// ============================================================================
// Claim Tests
// ============================================================================

mod claim_tests {
    use super::*;

    #[test]
    fn test_submission_from_json_derives_balance() {
        let json = r#"{
            "claim_id": "CLM002-2024-RAVI",
            "patient_name": "Ravi Kumar",
            "policy_number": "POL-77-0042",
            "claim_amount": {"amount": "120000", "currency": "INR"},
            "claim_date": "2024-05-02",
            "diagnosis": "Appendicitis",
            "treatment_type": "Laparoscopic appendectomy",
            "hospital": "Lakeside Hospital",
            "documents_available": ["discharge_summary", "final_bill"],
            "policy_coverage_limit": {"amount": "300000", "currency": "INR"},
            "previously_claimed_amount": {"amount": "100000", "currency": "INR"},
            "policy_year": "2024"
        }"#;

        let submission: ClaimSubmission = serde_json::from_str(json).unwrap();
        let claim = ClaimRecord::submit(submission).unwrap();

        assert_eq!(claim.available_balance.amount(), dec!(200000));
        assert_eq!(claim.documents_available.len(), 2);
        assert_eq!(claim.status, ClaimStatus::Submitted);
    }

    #[test]
    fn test_negative_amount_fails_validation() {
        let claim = ClaimRecordBuilder::new()
            .with_previously_claimed(dec!(-1))
            .build();
        assert!(claim.validate().is_err());
    }

    #[test]
    fn test_scenario_claim_is_valid() {
        assert!(scenario_claim().validate().is_ok());
    }
}

// ============================================================================
// Extraction Tests
// ============================================================================

mod extraction_tests {
    use super::*;

    const FULL_COORDINATOR: &str = "\
## Claim Decision

**FINAL DECISION:** APPROVED
**FINAL APPROVED AMOUNT:** ₹72,500
**FRAUD_RISK:** LOW
**POLICY BALANCE STATUS:** SUFFICIENT

**Rationale:**
Treatment is consistent with the diagnosis.
Billing matches the tariff schedule.

**Balance After Claim:** ₹377,500";

    #[test]
    fn test_scenario_a_minimal_coordinator() {
        let claim = scenario_claim();
        let log = log_of(&[
            ("fraud_detection_specialist", "No anomalies found."),
            ("decision_coordinator", "Decision: APPROVED\nApproved Amount: ₹72500"),
        ]);

        let extracted = DecisionExtractor::extract(&log, &claim);
        let decision = FinancialCalculator::reconcile(&claim, extracted);

        assert_eq!(decision.decision, DecisionOutcome::Approved);
        assert_eq!(decision.approved_amount.amount(), dec!(72500));
        assert_eq!(decision.remaining_balance.amount(), dec!(377500));
        assert_eq!(decision.policy_utilization_percent, dec!(14.5));
        assert_decision_invariants(&claim, &decision);
    }

    #[test]
    fn test_fully_labelled_coordinator_is_agent_derived() {
        let claim = scenario_claim();
        let log = log_of(&[("decision_coordinator", FULL_COORDINATOR)]);

        let decision = DecisionExtractor::extract(&log, &claim);

        assert_eq!(decision.decision_source, DecisionSource::AgentDerived);
        assert!(decision.defaulted_fields.is_empty());
        assert_eq!(decision.fraud_risk_level, RiskLevel::Low);
        assert_eq!(decision.balance_status, BalanceStatus::Sufficient);
        assert_eq!(
            decision.rationale,
            "Treatment is consistent with the diagnosis.\nBilling matches the tariff schedule."
        );
    }

    #[test]
    fn test_scenario_b_no_decision_label() {
        let claim = scenario_claim();
        let log = log_of(&[
            ("medical_validator", "Diagnosis and treatment are consistent."),
            ("decision_coordinator", "The documents look broadly fine to me."),
        ]);

        let decision = FinancialCalculator::reconcile(&claim, DecisionExtractor::extract(&log, &claim));

        assert_eq!(decision.decision, DecisionOutcome::Pending);
        assert_eq!(decision.decision_source, DecisionSource::FallbackDefault);
        assert!(decision.approved_amount.is_zero());
        assert!(decision.defaulted_fields.contains(&DecisionField::Decision));
        assert!(decision.has_indicator(IndicatorCategory::IncompleteAnalysis));
    }

    #[test]
    fn test_empty_log_yields_defaults() {
        let claim = scenario_claim();
        let decision = DecisionExtractor::extract(&ConversationLog::new(), &claim);

        assert_eq!(decision.decision, DecisionOutcome::Pending);
        assert_eq!(decision.fraud_risk_level, RiskLevel::Medium);
        assert_eq!(decision.balance_status, BalanceStatus::Sufficient);
        assert_eq!(decision.rationale, "insufficient structured output");
        assert_eq!(decision.defaulted_fields.len(), 5);
    }

    #[test]
    fn test_fallback_scans_most_recent_first() {
        let claim = scenario_claim();
        let log = log_of(&[
            ("fraud_detection_specialist", "Fraud risk: HIGH"),
            ("billing_validator", "Fraud risk: LOW"),
            ("decision_coordinator", "Decision: APPROVED"),
        ]);

        let decision = DecisionExtractor::extract(&log, &claim);
        assert_eq!(decision.fraud_risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_coordinator_fields_are_never_overridden() {
        let claim = scenario_claim();
        let log = log_of(&[
            ("policy_balance_validator", "Decision: REJECTED\nApproved Amount: ₹0"),
            ("decision_coordinator", "FINAL DECISION: APPROVED\nApproved Amount: ₹60,000"),
        ]);

        let decision = DecisionExtractor::extract(&log, &claim);
        assert_eq!(decision.decision, DecisionOutcome::Approved);
        assert_eq!(decision.approved_amount.amount(), dec!(60000));
    }

    #[test]
    fn test_failed_coordinator_falls_back_to_prior_entries() {
        let claim = scenario_claim();
        let mut log = log_of(&[("policy_adjustment_coordinator", "Decision: REJECTED")]);
        let now = Utc::now();
        log.append(CapabilityResult::timed_out(
            CapabilityId::new("decision_coordinator").unwrap(),
            StageId::new("decision").unwrap(),
            "no response within 120s",
            now,
            now,
        ))
        .unwrap();

        let decision = DecisionExtractor::extract(&log, &claim);
        assert_eq!(decision.decision, DecisionOutcome::Rejected);
        assert_eq!(decision.decision_source, DecisionSource::FallbackDefault);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let claim = scenario_claim();
        let log = log_of(&[
            ("fraud_detection_specialist", "RED FLAG: HIGH: invoice dated before admission"),
            ("decision_coordinator", FULL_COORDINATOR),
        ]);
        let copy = log.clone();

        assert_eq!(
            DecisionExtractor::extract(&log, &claim),
            DecisionExtractor::extract(&copy, &claim)
        );
    }

    #[test]
    fn test_indicator_lines_collected_in_log_order_without_duplicates() {
        let claim = scenario_claim();
        let log = log_of(&[
            (
                "fraud_detection_specialist",
                "- FRAUD INDICATOR: CRITICAL: brain MRI billed for a wrist fracture\n- RED FLAG: None",
            ),
            (
                "billing_validator",
                "RED FLAG: duplicate pharmacy line items\nFRAUD INDICATOR: critical: Brain MRI billed for a wrist fracture",
            ),
            ("decision_coordinator", FULL_COORDINATOR),
        ]);

        let decision = DecisionExtractor::extract(&log, &claim);
        let findings: Vec<_> = decision
            .fraud_indicators
            .iter()
            .filter(|i| i.category == IndicatorCategory::CapabilityFinding)
            .collect();

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(findings[0].description, "brain MRI billed for a wrist fracture");
        assert_eq!(findings[1].severity, Severity::Medium);
        assert_eq!(findings[1].description, "duplicate pharmacy line items");
    }
}

// ============================================================================
// Financial Reconciliation Tests
// ============================================================================

mod financial_tests {
    use super::*;

    #[test]
    fn test_scenario_d_amount_clamped_to_available_balance() {
        let claim = ClaimRecordBuilder::new()
            .with_claim_amount(dec!(500000))
            .with_coverage_limit(dec!(500000))
            .with_previously_claimed(dec!(50000))
            .with_available_balance(dec!(450000))
            .build();

        let decision = FinancialCalculator::reconcile(
            &claim,
            extracted_decision(&claim, DecisionOutcome::Approved, dec!(500000)),
        );

        assert_eq!(decision.approved_amount.amount(), dec!(450000));
        assert!(decision.remaining_balance.is_zero());
        assert!(decision.has_indicator(IndicatorCategory::BalanceExceeded));
        assert_eq!(decision.policy_utilization_percent, dec!(100));
        assert_eq!(decision.balance_status, BalanceStatus::Low);
        assert_decision_invariants(&claim, &decision);
    }

    #[test]
    fn test_rejected_forces_zero() {
        let claim = scenario_claim();
        let decision = FinancialCalculator::reconcile(
            &claim,
            extracted_decision(&claim, DecisionOutcome::Rejected, dec!(10000)),
        );

        assert!(decision.approved_amount.is_zero());
        assert_eq!(decision.remaining_balance, claim.available_balance);
        assert!(!decision.has_indicator(IndicatorCategory::BalanceExceeded));
    }

    #[test]
    fn test_amount_clamped_to_claim_amount() {
        let claim = scenario_claim();
        let decision = FinancialCalculator::reconcile(
            &claim,
            extracted_decision(&claim, DecisionOutcome::Approved, dec!(90000)),
        );

        assert_eq!(decision.approved_amount.amount(), dec!(75000));
        assert!(!decision.has_indicator(IndicatorCategory::BalanceExceeded));
    }

    #[test]
    fn test_utilization_above_limit_is_over_limit() {
        let claim = ClaimRecordBuilder::new()
            .with_claim_amount(dec!(50000))
            .with_coverage_limit(dec!(500000))
            .with_previously_claimed(dec!(480000))
            .with_available_balance(dec!(100000))
            .build();

        let decision = FinancialCalculator::reconcile(
            &claim,
            extracted_decision(&claim, DecisionOutcome::Approved, dec!(50000)),
        );

        assert_eq!(decision.policy_utilization_percent, dec!(106));
        assert_eq!(decision.balance_status, BalanceStatus::OverLimit);
    }

    #[test]
    fn test_low_balance_below_ten_percent() {
        let claim = ClaimRecordBuilder::new()
            .with_claim_amount(dec!(20000))
            .with_coverage_limit(dec!(500000))
            .with_previously_claimed(dec!(440000))
            .with_available_balance(dec!(60000))
            .build();

        let decision = FinancialCalculator::reconcile(
            &claim,
            extracted_decision(&claim, DecisionOutcome::Approved, dec!(20000)),
        );

        assert_eq!(decision.remaining_balance.amount(), dec!(40000));
        assert_eq!(decision.balance_status, BalanceStatus::Low);
    }

    #[test]
    fn test_huge_usage_on_tiny_limit_is_over_limit() {
        let claim = ClaimRecordBuilder::new()
            .with_coverage_limit(dec!(0.01))
            .with_previously_claimed(dec!(70000000000000000000000000000))
            .build();
        assert!(claim.validate().is_ok());

        let decision = FinancialCalculator::reconcile(
            &claim,
            extracted_decision(&claim, DecisionOutcome::Approved, dec!(72500)),
        );

        assert_eq!(decision.approved_amount.amount(), dec!(72500));
        assert_eq!(decision.policy_utilization_percent, Decimal::MAX);
        assert_eq!(decision.balance_status, BalanceStatus::OverLimit);
        assert_decision_invariants(&claim, &decision);
    }

    #[test]
    fn test_usage_beyond_decimal_range_saturates() {
        let claim = ClaimRecordBuilder::new()
            .with_claim_amount(dec!(79000000000000000000000000000))
            .with_available_balance(dec!(79000000000000000000000000000))
            .with_previously_claimed(dec!(79000000000000000000000000000))
            .build();

        let decision = FinancialCalculator::reconcile(
            &claim,
            extracted_decision(&claim, DecisionOutcome::Approved, dec!(79000000000000000000000000000)),
        );

        assert_eq!(decision.balance_status, BalanceStatus::OverLimit);
        assert_decision_invariants(&claim, &decision);
    }

    #[test]
    fn test_reconcile_keeps_extracted_provenance() {
        let claim = scenario_claim();
        let mut extracted = extracted_decision(&claim, DecisionOutcome::Approved, dec!(1000));
        extracted.decision_source = DecisionSource::FallbackDefault;
        extracted.defaulted_fields = vec![DecisionField::Rationale];

        let decision = FinancialCalculator::reconcile(&claim, extracted);
        assert_eq!(decision.decision_source, DecisionSource::FallbackDefault);
        assert_eq!(decision.defaulted_fields, vec![DecisionField::Rationale]);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use test_utils::generators::{claim_figures, decision_outcome, extreme_claim_figures, huge_amount_strategy};

    proptest! {
        #[test]
        fn prop_reconciled_decisions_hold_invariants(
            figures in claim_figures(),
            extracted in 0u64..2_000_000u64,
            outcome in decision_outcome(),
        ) {
            let claim = ClaimRecordBuilder::new()
                .with_claim_amount(figures.claim_amount)
                .with_coverage_limit(figures.coverage_limit)
                .with_previously_claimed(figures.previously_claimed)
                .with_available_balance(figures.available_balance)
                .build();

            let decision = FinancialCalculator::reconcile(
                &claim,
                extracted_decision(&claim, outcome, Decimal::from(extracted)),
            );

            assert_decision_invariants(&claim, &decision);
            prop_assert_eq!(
                decision.has_indicator(IndicatorCategory::BalanceExceeded),
                Decimal::from(extracted) > figures.available_balance
            );
        }

        #[test]
        fn prop_reconcile_survives_extreme_magnitudes(
            figures in extreme_claim_figures(),
            extracted in huge_amount_strategy(),
            outcome in decision_outcome(),
        ) {
            let claim = ClaimRecordBuilder::new()
                .with_claim_amount(figures.claim_amount)
                .with_coverage_limit(figures.coverage_limit)
                .with_previously_claimed(figures.previously_claimed)
                .with_available_balance(figures.available_balance)
                .build();
            prop_assert!(claim.validate().is_ok());

            let decision = FinancialCalculator::reconcile(
                &claim,
                extracted_decision(&claim, outcome, extracted),
            );

            assert_decision_invariants(&claim, &decision);
            prop_assert!(decision.policy_utilization_percent >= Decimal::ZERO);
        }

        #[test]
        fn prop_extraction_never_fails_on_arbitrary_text(text in ".{0,400}") {
            let claim = scenario_claim();
            let log = log_of(&[("decision_coordinator", text.as_str())]);
            let decision = FinancialCalculator::reconcile(&claim, DecisionExtractor::extract(&log, &claim));
            assert_decision_invariants(&claim, &decision);
        }
    }
}
