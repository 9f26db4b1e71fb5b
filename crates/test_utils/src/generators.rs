//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use std::time::Duration;

use domain_claims::DecisionOutcome;
use fake::faker::name::en::Name;
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Policy figures for a generated claim
#[derive(Debug, Clone)]
pub struct ClaimFigures {
    pub claim_amount: Decimal,
    pub coverage_limit: Decimal,
    pub previously_claimed: Decimal,
    pub available_balance: Decimal,
}

/// Strategy for whole-rupee amounts up to one million
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0u64..1_000_000u64).prop_map(Decimal::from)
}

/// Strategy for claim figures with a positive coverage limit
///
/// The available balance is usually the limit minus what was claimed, but
/// is sometimes unrelated to it, as when the insurer supplies it directly.
pub fn claim_figures() -> impl Strategy<Value = ClaimFigures> {
    (1u64..1_000_000u64, 0u64..1_000_000u64, 0u64..1_200_000u64, any::<bool>()).prop_flat_map(
        |(limit, claim, previous, derived)| {
            let limit = Decimal::from(limit);
            let previous = Decimal::from(previous);
            let derived_balance = (limit - previous).max(Decimal::ZERO);
            amount_strategy().prop_map(move |free_balance| ClaimFigures {
                claim_amount: Decimal::from(claim),
                coverage_limit: limit,
                previously_claimed: previous,
                available_balance: if derived { derived_balance } else { free_balance },
            })
        },
    )
}

/// Strategy for amounts anywhere in the representable decimal range
pub fn huge_amount_strategy() -> impl Strategy<Value = Decimal> {
    (0u128..79_000_000_000_000_000_000_000_000_000u128)
        .prop_map(|value| Decimal::from_i128_with_scale(value as i128, 0))
}

/// Strategy for claim figures at the edge of the decimal range: huge
/// amounts against coverage limits as small as one paisa
pub fn extreme_claim_figures() -> impl Strategy<Value = ClaimFigures> {
    (
        1i64..10_000i64,
        huge_amount_strategy(),
        huge_amount_strategy(),
        huge_amount_strategy(),
    )
        .prop_map(|(limit_paise, claim, previous, available)| ClaimFigures {
            claim_amount: claim,
            coverage_limit: Decimal::new(limit_paise, 2),
            previously_claimed: previous,
            available_balance: available,
        })
}

/// Strategy for decision outcomes
pub fn decision_outcome() -> impl Strategy<Value = DecisionOutcome> {
    prop_oneof![
        Just(DecisionOutcome::Approved),
        Just(DecisionOutcome::Rejected),
        Just(DecisionOutcome::Pending),
    ]
}

/// Strategy for capability latencies
pub fn latency_strategy() -> impl Strategy<Value = Duration> {
    (0u64..500u64).prop_map(Duration::from_millis)
}

/// A random patient name
pub fn fake_patient_name() -> String {
    Name().fake()
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_claim_figures_have_positive_limit(figures in claim_figures()) {
            prop_assert!(figures.coverage_limit > Decimal::ZERO);
            prop_assert!(figures.available_balance >= Decimal::ZERO);
        }

        #[test]
        fn prop_extreme_figures_have_positive_limit(figures in extreme_claim_figures()) {
            prop_assert!(figures.coverage_limit > Decimal::ZERO);
        }
    }

    #[test]
    fn test_fake_patient_name_not_blank() {
        assert!(!fake_patient_name().trim().is_empty());
    }
}
