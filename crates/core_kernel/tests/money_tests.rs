//! Unit and property tests for the Money module
//!
//! Covers creation, checked arithmetic, clamping, percentage maths and
//! presentation formatting.

use core_kernel::{Currency, Money, MoneyError, Rate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cmp::Ordering;

mod creation {
    use super::*;

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::INR);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::INR);
        assert!(m.is_zero());
        assert!(!m.is_negative());
        assert!(!m.is_positive());
    }

    #[test]
    fn test_default_currency_is_inr() {
        assert_eq!(Currency::default(), Currency::INR);
        assert_eq!(Currency::INR.symbol(), "₹");
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_add_and_sub() {
        let a = Money::new(dec!(450000), Currency::INR);
        let b = Money::new(dec!(72500), Currency::INR);
        assert_eq!(a.checked_sub(&b).unwrap().amount(), dec!(377500));
        assert_eq!(a.checked_add(&b).unwrap().amount(), dec!(522500));
    }

    #[test]
    fn test_checked_cmp_mismatch() {
        let a = Money::new(dec!(1), Currency::INR);
        let b = Money::new(dec!(1), Currency::EUR);
        assert_eq!(
            a.checked_cmp(&b),
            Err(MoneyError::CurrencyMismatch("INR".to_string(), "EUR".to_string()))
        );
    }

    #[test]
    fn test_percentage_of() {
        let part = Money::new(dec!(72500), Currency::INR);
        let whole = Money::new(dec!(500000), Currency::INR);
        assert_eq!(part.percentage_of(&whole).unwrap(), dec!(14.5));
    }

    #[test]
    fn test_percentage_of_zero_whole() {
        let part = Money::new(dec!(1), Currency::INR);
        let whole = Money::zero(Currency::INR);
        assert_eq!(part.percentage_of(&whole), Err(MoneyError::DivisionByZero));
    }

    #[test]
    fn test_checked_add_overflow() {
        let huge = Money::new(Decimal::MAX, Currency::INR);
        let one = Money::new(dec!(1), Currency::INR);
        assert_eq!(huge.checked_add(&one), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_percentage_of_tiny_whole_overflows() {
        let part = Money::new(dec!(70000000000000000000000000000), Currency::INR);
        let whole = Money::new(dec!(0.01), Currency::INR);
        assert_eq!(part.percentage_of(&whole), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_multiply_saturates() {
        let huge = Money::new(Decimal::MAX, Currency::INR);
        assert_eq!(huge.multiply(dec!(2)).amount(), Decimal::MAX);
    }

    #[test]
    fn test_rate_display() {
        let rate = Rate::from_percentage(dec!(10));
        assert_eq!(rate.as_decimal(), dec!(0.1));
        assert!(rate.to_string().starts_with("10"));
        assert!(rate.to_string().ends_with('%'));
    }
}

mod formatting {
    use super::*;

    #[test]
    fn test_display_uses_symbol() {
        let m = Money::new(dec!(1500.5), Currency::INR);
        assert_eq!(m.to_string(), "₹ 1500.50");
    }

    #[test]
    fn test_grouped_negative() {
        let m = Money::new(dec!(-1234567.891), Currency::USD);
        assert_eq!(m.format_grouped(), "-$1,234,567.89");
    }
}

proptest! {
    #[test]
    fn prop_checked_min_is_lower_bound(a in 0i64..1_000_000_000, b in 0i64..1_000_000_000) {
        let x = Money::new(Decimal::new(a, 2), Currency::INR);
        let y = Money::new(Decimal::new(b, 2), Currency::INR);
        let min = x.checked_min(&y).unwrap();
        prop_assert_ne!(min.checked_cmp(&x).unwrap(), Ordering::Greater);
        prop_assert_ne!(min.checked_cmp(&y).unwrap(), Ordering::Greater);
        prop_assert!(min == x || min == y);
    }

    #[test]
    fn prop_clamp_never_negative(a in -1_000_000_000i64..1_000_000_000) {
        let m = Money::new(Decimal::new(a, 2), Currency::INR);
        prop_assert!(!m.clamp_non_negative().is_negative());
    }
}
