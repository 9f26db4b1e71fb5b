//! Money types with precise decimal arithmetic
//!
//! Claim amounts, policy limits and balances are all carried as [`Money`] so
//! that reconciliation never touches floating point. Operations that combine
//! two amounts are checked and fail on a currency mismatch instead of
//! panicking.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
    SGD,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        2
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "₹",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::SGD => "S$",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::SGD => "SGD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow")]
    Overflow,
}

/// A monetary amount with associated currency
///
/// Amounts are stored with 4 decimal places internally; presentation rounds
/// to the currency's minor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Rounds to the currency's standard decimal places
    pub fn round_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp_with_strategy(
                self.currency.decimal_places(),
                RoundingStrategy::MidpointAwayFromZero,
            ),
            currency: self.currency,
        }
    }

    /// Returns the amount floored at zero
    pub fn clamp_non_negative(&self) -> Self {
        if self.is_negative() {
            Self::zero(self.currency)
        } else {
            *self
        }
    }

    /// Checked addition that returns an error on currency mismatch or overflow
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let sum = self.amount.checked_add(other.amount).ok_or(MoneyError::Overflow)?;
        Ok(Self::new(sum, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch or overflow
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let difference = self.amount.checked_sub(other.amount).ok_or(MoneyError::Overflow)?;
        Ok(Self::new(difference, self.currency))
    }

    /// Returns the smaller of two amounts in the same currency
    pub fn checked_min(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(if other.amount < self.amount { *other } else { *self })
    }

    /// Compares two amounts in the same currency
    pub fn checked_cmp(&self, other: &Money) -> Result<Ordering, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    /// Multiplies by a scalar (e.g., for rate calculations), saturating at
    /// the representable range
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.amount.saturating_mul(factor), self.currency)
    }

    /// Expresses this amount as a percentage of `whole`
    pub fn percentage_of(&self, whole: &Money) -> Result<Decimal, MoneyError> {
        self.ensure_same_currency(whole)?;
        if whole.amount.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        self.amount
            .checked_div(whole.amount)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .ok_or(MoneyError::Overflow)
    }

    /// Formats the amount with the currency symbol and thousands separators,
    /// e.g. `₹3,96,591.00` is rendered as `₹396,591.00`
    pub fn format_grouped(&self) -> String {
        let rounded = self.round_to_currency();
        let dp = self.currency.decimal_places() as usize;
        let text = format!("{:.dp$}", rounded.amount.abs(), dp = dp);
        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole.to_string(), Some(fraction.to_string())),
            None => (text.clone(), None),
        };

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if rounded.is_negative() { "-" } else { "" };
        match fraction {
            Some(fraction) => format!("{}{}{}.{}", sign, self.currency.symbol(), grouped, fraction),
            None => format!("{}{}{}", sign, self.currency.symbol(), grouped),
        }
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{} {:.dp$}",
            self.currency.symbol(),
            self.amount,
            dp = dp as usize
        )
    }
}

/// Represents a percentage rate (e.g., a low-balance threshold)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.10 for 10%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a decimal value (e.g., 0.10 for 10%)
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a rate from a percentage (e.g., 10.0 for 10%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    /// Applies this rate to a money amount
    pub fn apply(&self, money: &Money) -> Money {
        money.multiply(self.value)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let m = Money::new(dec!(100.50), Currency::INR);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.currency(), Currency::INR);
    }

    #[test]
    fn test_checked_min_picks_smaller() {
        let a = Money::new(dec!(500000), Currency::INR);
        let b = Money::new(dec!(450000), Currency::INR);
        assert_eq!(a.checked_min(&b).unwrap(), b);
        assert_eq!(b.checked_min(&a).unwrap(), b);
    }

    #[test]
    fn test_currency_mismatch() {
        let a = Money::new(dec!(100), Currency::INR);
        let b = Money::new(dec!(100), Currency::USD);
        assert!(matches!(a.checked_sub(&b), Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_clamp_non_negative() {
        let m = Money::new(dec!(-10), Currency::INR);
        assert!(m.clamp_non_negative().is_zero());
        let p = Money::new(dec!(10), Currency::INR);
        assert_eq!(p.clamp_non_negative(), p);
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(Money::new(dec!(396591), Currency::INR).format_grouped(), "₹396,591.00");
        assert_eq!(Money::new(dec!(72500.5), Currency::INR).format_grouped(), "₹72,500.50");
        assert_eq!(Money::new(dec!(999), Currency::USD).format_grouped(), "$999.00");
        assert_eq!(Money::zero(Currency::INR).format_grouped(), "₹0.00");
    }

    #[test]
    fn test_rate_apply() {
        let rate = Rate::from_percentage(dec!(10));
        let limit = Money::new(dec!(500000), Currency::INR);
        assert_eq!(rate.apply(&limit).amount(), dec!(50000));
    }
}
