//! Financial reconciliation of an extracted decision
//!
//! Extracted amounts come from prose and cannot be trusted. Reconciliation
//! clamps them against the claim and the policy, and derives the balance
//! figures from the clamped amount. The rules run in a fixed order:
//!
//! 1. approved = min(extracted, claim amount, available balance), floored at 0
//! 2. a rejected claim is approved for 0
//! 3. remaining = max(0, available - approved); an extracted amount above the
//!    available balance raises a `BalanceExceeded` indicator
//! 4. utilization = (previously claimed + approved) / coverage limit * 100,
//!    rounded half away from zero to two places; above 100 is `OverLimit`
//! 5. otherwise `Low` below 10% of the coverage limit, else `Sufficient`

use std::cmp::Ordering;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use core_kernel::{Money, MoneyError, Rate};
use crate::claim::ClaimRecord;
use crate::decision::{BalanceStatus, Decision, DecisionOutcome, FraudIndicator, IndicatorCategory, Severity};

/// Remaining balance below this share of the coverage limit is `Low`
pub const LOW_BALANCE_PERCENT: Decimal = dec!(10);

pub struct FinancialCalculator;

impl FinancialCalculator {
    /// Reconciles `decision` against the claim's policy figures
    ///
    /// Never panics: amounts beyond the decimal range saturate, so an
    /// oversized utilization still reads as `OverLimit`.
    pub fn reconcile(claim: &ClaimRecord, decision: Decision) -> Decision {
        let currency = claim.currency();
        let extracted = Money::new(decision.approved_amount.amount(), currency);
        let mut reconciled = decision;

        let approved = if reconciled.decision == DecisionOutcome::Rejected {
            Money::zero(currency)
        } else {
            extracted
                .checked_min(&claim.claim_amount)
                .and_then(|amount| amount.checked_min(&claim.available_balance))
                .map(|amount| amount.clamp_non_negative())
                .unwrap_or_else(|e| {
                    warn!(claim_id = %claim.id, error = %e, "Cannot clamp approved amount, approving nothing");
                    Money::zero(currency)
                })
        };

        if extracted.checked_cmp(&claim.available_balance) == Ok(Ordering::Greater) {
            warn!(
                claim_id = %claim.id,
                extracted = %extracted,
                available = %claim.available_balance,
                "Approved amount exceeds available balance"
            );
            reconciled.push_indicator(FraudIndicator::new(
                IndicatorCategory::BalanceExceeded,
                Severity::High,
                format!(
                    "Approved amount {} exceeds available policy balance {}",
                    extracted.format_grouped(),
                    claim.available_balance.format_grouped()
                ),
            ));
        }

        let remaining = claim
            .available_balance
            .checked_sub(&approved)
            .map(|amount| amount.clamp_non_negative())
            .unwrap_or_else(|_| Money::zero(currency));
        let used = claim
            .previously_claimed_amount
            .checked_add(&approved)
            .unwrap_or_else(|_| Money::new(Decimal::MAX, currency));
        let utilization = Self::utilization_percent(&used, &claim.policy_coverage_limit);

        let low_threshold = Rate::from_percentage(LOW_BALANCE_PERCENT).apply(&claim.policy_coverage_limit);
        let balance_status = if utilization > dec!(100) {
            BalanceStatus::OverLimit
        } else if remaining.checked_cmp(&low_threshold) == Ok(Ordering::Less) {
            BalanceStatus::Low
        } else {
            BalanceStatus::Sufficient
        };

        debug!(
            claim_id = %claim.id,
            approved = %approved,
            remaining = %remaining,
            utilization = %utilization,
            balance_status = %balance_status,
            "Reconciled decision"
        );

        reconciled.approved_amount = approved;
        reconciled.remaining_balance = remaining;
        reconciled.policy_utilization_percent = utilization;
        reconciled.balance_status = balance_status;
        reconciled
    }

    /// Share of `limit` used by `used`, two decimals
    ///
    /// Zero when there is no limit; saturates at `Decimal::MAX` when the
    /// share is too large to represent.
    pub fn utilization_percent(used: &Money, limit: &Money) -> Decimal {
        if !limit.is_positive() {
            return Decimal::ZERO;
        }
        match used.percentage_of(limit) {
            Ok(percent) => percent.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            Err(MoneyError::Overflow) => Decimal::MAX,
            Err(_) => Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;

    fn inr(amount: Decimal) -> Money {
        Money::new(amount, Currency::INR)
    }

    #[test]
    fn test_utilization_rounds_half_away_from_zero() {
        // 1 / 800 * 100 = 0.125
        assert_eq!(FinancialCalculator::utilization_percent(&inr(dec!(1)), &inr(dec!(800))), dec!(0.13));
        assert_eq!(
            FinancialCalculator::utilization_percent(&inr(dec!(72500)), &inr(dec!(500000))),
            dec!(14.5)
        );
    }

    #[test]
    fn test_utilization_without_limit_is_zero() {
        assert_eq!(FinancialCalculator::utilization_percent(&inr(dec!(100)), &inr(dec!(0))), Decimal::ZERO);
    }

    #[test]
    fn test_utilization_is_not_clamped() {
        assert_eq!(FinancialCalculator::utilization_percent(&inr(dec!(600)), &inr(dec!(500))), dec!(120));
    }

    #[test]
    fn test_utilization_saturates_on_tiny_limit() {
        let used = inr(dec!(70000000000000000000000000000));
        assert_eq!(FinancialCalculator::utilization_percent(&used, &inr(dec!(0.01))), Decimal::MAX);
    }
}
