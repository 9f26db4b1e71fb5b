//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use core_kernel::{ClaimId, Currency, Money};
use domain_claims::{ClaimRecord, ClaimStatus};
use rust_decimal::Decimal;

use crate::fixtures::ClaimFixtures;

/// Builder for claim records
///
/// `build` does not validate, so tests can construct malformed claims on
/// purpose.
pub struct ClaimRecordBuilder {
    record: ClaimRecord,
}

impl Default for ClaimRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimRecordBuilder {
    /// Creates a new builder seeded with the reference scenario claim
    pub fn new() -> Self {
        Self {
            record: ClaimFixtures::scenario_a(),
        }
    }

    fn money(&self, amount: Decimal) -> Money {
        Money::new(amount, self.record.currency())
    }

    /// Sets the claim ID
    pub fn with_id(mut self, id: &str) -> Self {
        self.record.id = ClaimId::new(id).unwrap();
        self
    }

    /// Sets the patient name
    pub fn with_patient_name(mut self, name: impl Into<String>) -> Self {
        self.record.patient_name = name.into();
        self
    }

    /// Sets the claimed amount
    pub fn with_claim_amount(mut self, amount: Decimal) -> Self {
        self.record.claim_amount = self.money(amount);
        self
    }

    /// Sets the policy coverage limit
    pub fn with_coverage_limit(mut self, amount: Decimal) -> Self {
        self.record.policy_coverage_limit = self.money(amount);
        self
    }

    /// Sets the amount already claimed this policy year
    pub fn with_previously_claimed(mut self, amount: Decimal) -> Self {
        self.record.previously_claimed_amount = self.money(amount);
        self
    }

    /// Sets the available balance
    pub fn with_available_balance(mut self, amount: Decimal) -> Self {
        self.record.available_balance = self.money(amount);
        self
    }

    /// Moves every amount to another currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        let record = &mut self.record;
        record.claim_amount = Money::new(record.claim_amount.amount(), currency);
        record.policy_coverage_limit = Money::new(record.policy_coverage_limit.amount(), currency);
        record.previously_claimed_amount = Money::new(record.previously_claimed_amount.amount(), currency);
        record.available_balance = Money::new(record.available_balance.amount(), currency);
        self
    }

    /// Sets the status
    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.record.status = status;
        self
    }

    /// Builds the claim record
    pub fn build(self) -> ClaimRecord {
        self.record
    }
}
