//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use domain_claims::{ClaimRecord, ConversationLog, Decision, DecisionOutcome, DecisionSource};
use rust_decimal::Decimal;

/// Asserts the financial invariants every reconciled decision must hold
///
/// # Panics
///
/// Panics if the approved amount is negative or above the claim amount or
/// the available balance, if the remaining balance does not equal the
/// available balance minus the approved amount, or if a rejected claim has
/// a non-zero approved amount.
pub fn assert_decision_invariants(claim: &ClaimRecord, decision: &Decision) {
    let approved = decision.approved_amount.amount();
    let available = claim.available_balance.amount();

    assert!(approved >= Decimal::ZERO, "Approved amount is negative: {}", approved);
    assert!(
        approved <= claim.claim_amount.amount(),
        "Approved amount {} exceeds claim amount {}",
        approved,
        claim.claim_amount.amount()
    );
    assert!(
        approved <= available,
        "Approved amount {} exceeds available balance {}",
        approved,
        available
    );
    assert_eq!(
        decision.remaining_balance.amount(),
        available - approved,
        "Remaining balance must be available balance minus approved amount"
    );
    assert!(
        decision.remaining_balance.amount() >= Decimal::ZERO,
        "Remaining balance is negative"
    );
    if decision.decision == DecisionOutcome::Rejected {
        assert!(approved.is_zero(), "Rejected claim approved for {}", approved);
    }
    assert_eq!(
        decision.decision_source == DecisionSource::FallbackDefault,
        !decision.defaulted_fields.is_empty(),
        "Decision source disagrees with defaulted fields: {:?}",
        decision.defaulted_fields
    );
}

/// Asserts the log holds exactly these capabilities, in this order
pub fn assert_log_order(log: &ConversationLog, expected: &[&str]) {
    let actual: Vec<&str> = log.all().iter().map(|r| r.capability_id.as_str()).collect();
    assert_eq!(actual, expected, "Conversation log order differs");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{ClaimFixtures, DecisionFixtures, LogFixtures};
    use domain_claims::FinancialCalculator;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reconciled_decision_passes() {
        let claim = ClaimFixtures::scenario_a();
        let decision = FinancialCalculator::reconcile(
            &claim,
            DecisionFixtures::extracted(&claim, DecisionOutcome::Approved, dec!(72500)),
        );
        assert_decision_invariants(&claim, &decision);
    }

    #[test]
    #[should_panic(expected = "exceeds available balance")]
    fn test_unreconciled_overpayment_fails() {
        let claim = crate::builders::ClaimRecordBuilder::new()
            .with_claim_amount(dec!(500000))
            .build();
        let decision = DecisionFixtures::extracted(&claim, DecisionOutcome::Approved, dec!(460000));
        assert_decision_invariants(&claim, &decision);
    }

    #[test]
    fn test_log_order() {
        let log = LogFixtures::completed(&[("a", "x"), ("b", "y")]);
        assert_log_order(&log, &["a", "b"]);
    }
}
