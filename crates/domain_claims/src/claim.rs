//! Claim record and status lifecycle

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, Currency, Money};
use crate::decision::DecisionOutcome;
use crate::error::ClaimError;

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Accepted from the caller, not yet processed
    Submitted,
    /// An adjudication run is in flight
    InProgress,
    /// Last run approved the claim
    Approved,
    /// Last run rejected the claim
    Rejected,
    /// Last run could not reach a firm decision
    Pending,
}

impl ClaimStatus {
    /// Returns true for statuses that only a completed run can set
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Approved | ClaimStatus::Rejected | ClaimStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Submitted => "submitted",
            ClaimStatus::InProgress => "in_progress",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
            ClaimStatus::Pending => "pending",
        }
    }
}

impl From<DecisionOutcome> for ClaimStatus {
    fn from(outcome: DecisionOutcome) -> Self {
        match outcome {
            DecisionOutcome::Approved => ClaimStatus::Approved,
            DecisionOutcome::Rejected => ClaimStatus::Rejected,
            DecisionOutcome::Pending => ClaimStatus::Pending,
        }
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller input for a new claim
///
/// `available_balance` may be omitted, in which case it is derived from the
/// coverage limit minus the amount already claimed this policy year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSubmission {
    pub claim_id: ClaimId,
    pub patient_name: String,
    pub policy_number: String,
    pub claim_amount: Money,
    pub claim_date: NaiveDate,
    pub diagnosis: String,
    pub treatment_type: String,
    pub hospital: String,
    #[serde(default)]
    pub documents_available: BTreeSet<String>,
    pub policy_coverage_limit: Money,
    pub previously_claimed_amount: Money,
    #[serde(default)]
    pub available_balance: Option<Money>,
    pub policy_year: String,
}

/// A claim as held by the adjudicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Insurer-issued claim number
    pub id: ClaimId,
    pub patient_name: String,
    pub policy_number: String,
    /// Amount requested by the claimant
    pub claim_amount: Money,
    pub claim_date: NaiveDate,
    pub diagnosis: String,
    pub treatment_type: String,
    pub hospital: String,
    /// Names of the documents the claimant attached
    pub documents_available: BTreeSet<String>,
    /// Annual coverage limit of the policy
    pub policy_coverage_limit: Money,
    /// Amount already paid out in the current policy year
    pub previously_claimed_amount: Money,
    /// Balance left on the policy before this claim
    pub available_balance: Money,
    pub policy_year: String,
    pub status: ClaimStatus,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClaimRecord {
    /// Accepts a submission, deriving the available balance when absent
    pub fn submit(submission: ClaimSubmission) -> Result<Self, ClaimError> {
        let available_balance = match submission.available_balance {
            Some(balance) => balance,
            None => submission
                .policy_coverage_limit
                .checked_sub(&submission.previously_claimed_amount)?
                .clamp_non_negative(),
        };

        let now = Utc::now();
        let record = Self {
            id: submission.claim_id,
            patient_name: submission.patient_name.trim().to_string(),
            policy_number: submission.policy_number.trim().to_string(),
            claim_amount: submission.claim_amount,
            claim_date: submission.claim_date,
            diagnosis: submission.diagnosis,
            treatment_type: submission.treatment_type,
            hospital: submission.hospital,
            documents_available: submission.documents_available,
            policy_coverage_limit: submission.policy_coverage_limit,
            previously_claimed_amount: submission.previously_claimed_amount,
            available_balance,
            policy_year: submission.policy_year,
            status: ClaimStatus::Submitted,
            submitted_at: now,
            updated_at: now,
        };
        record.validate()?;
        Ok(record)
    }

    /// The currency every amount on this claim is expressed in
    pub fn currency(&self) -> Currency {
        self.claim_amount.currency()
    }

    /// Checks the structural rules a claim must satisfy before adjudication
    pub fn validate(&self) -> Result<(), ClaimError> {
        if self.patient_name.trim().is_empty() {
            return Err(ClaimError::invalid_claim("patient name must not be empty"));
        }
        if self.policy_number.trim().is_empty() {
            return Err(ClaimError::invalid_claim("policy number must not be empty"));
        }

        let currency = self.currency();
        let amounts = [
            ("claim amount", &self.claim_amount),
            ("policy coverage limit", &self.policy_coverage_limit),
            ("previously claimed amount", &self.previously_claimed_amount),
            ("available balance", &self.available_balance),
        ];
        for (name, amount) in amounts {
            if amount.currency() != currency {
                return Err(ClaimError::invalid_claim(format!(
                    "{} is in {} but the claim is in {}",
                    name,
                    amount.currency(),
                    currency
                )));
            }
            if amount.is_negative() {
                return Err(ClaimError::invalid_claim(format!("{} must not be negative", name)));
            }
        }

        if !self.policy_coverage_limit.is_positive() {
            return Err(ClaimError::invalid_claim("policy coverage limit must be positive"));
        }
        Ok(())
    }

    /// Updates the status
    pub fn update_status(&mut self, status: ClaimStatus) -> Result<(), ClaimError> {
        if !self.can_transition_to(status) {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: status.to_string(),
            });
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Marks the claim as being processed by a new run
    pub fn begin_processing(&mut self) -> Result<(), ClaimError> {
        self.update_status(ClaimStatus::InProgress)
    }

    /// Records the outcome of a completed run
    pub fn complete_with(&mut self, outcome: DecisionOutcome) -> Result<(), ClaimError> {
        self.update_status(outcome.into())
    }

    /// Checks if transition is valid
    pub fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (Submitted, InProgress) |
            (InProgress, Approved) |
            (InProgress, Rejected) |
            (InProgress, Pending) |
            (Approved, InProgress) |
            (Rejected, InProgress) |
            (Pending, InProgress)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inr(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::INR)
    }

    fn submission() -> ClaimSubmission {
        ClaimSubmission {
            claim_id: ClaimId::new("CLM001-2024-LAKSHMI").unwrap(),
            patient_name: "Lakshmi Menon".to_string(),
            policy_number: "POL-88-1200".to_string(),
            claim_amount: inr(dec!(75000)),
            claim_date: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
            diagnosis: "Displaced radius fracture".to_string(),
            treatment_type: "Open reduction internal fixation".to_string(),
            hospital: "City General".to_string(),
            documents_available: ["discharge_summary".to_string()].into_iter().collect(),
            policy_coverage_limit: inr(dec!(500000)),
            previously_claimed_amount: inr(dec!(50000)),
            available_balance: None,
            policy_year: "2024".to_string(),
        }
    }

    #[test]
    fn test_submit_derives_available_balance() {
        let claim = ClaimRecord::submit(submission()).unwrap();
        assert_eq!(claim.available_balance.amount(), dec!(450000));
        assert_eq!(claim.status, ClaimStatus::Submitted);
    }

    #[test]
    fn test_submit_keeps_explicit_balance() {
        let mut input = submission();
        input.available_balance = Some(inr(dec!(120000)));
        let claim = ClaimRecord::submit(input).unwrap();
        assert_eq!(claim.available_balance.amount(), dec!(120000));
    }

    #[test]
    fn test_blank_patient_rejected() {
        let mut input = submission();
        input.patient_name = "  ".to_string();
        assert!(matches!(ClaimRecord::submit(input), Err(ClaimError::InvalidClaim(_))));
    }

    #[test]
    fn test_zero_coverage_limit_rejected() {
        let mut input = submission();
        input.policy_coverage_limit = inr(dec!(0));
        input.available_balance = Some(inr(dec!(0)));
        assert!(ClaimRecord::submit(input).is_err());
    }

    #[test]
    fn test_mixed_currency_rejected() {
        let mut input = submission();
        input.claim_amount = Money::new(dec!(900), Currency::USD);
        input.available_balance = Some(inr(dec!(450000)));
        assert!(ClaimRecord::submit(input).is_err());
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut claim = ClaimRecord::submit(submission()).unwrap();
        assert!(claim.complete_with(DecisionOutcome::Approved).is_err());

        claim.begin_processing().unwrap();
        assert!(claim.begin_processing().is_err());

        claim.complete_with(DecisionOutcome::Pending).unwrap();
        assert_eq!(claim.status, ClaimStatus::Pending);

        // Reprocessing a decided claim starts a new run
        claim.begin_processing().unwrap();
        claim.complete_with(DecisionOutcome::Rejected).unwrap();
        assert_eq!(claim.status, ClaimStatus::Rejected);
    }
}
