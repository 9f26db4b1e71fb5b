//! Claims DTOs

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ClaimId, Currency, Money, RecordId, SessionId};
use domain_claims::{ClaimRecord, ClaimStatus, ClaimSubmission, DecisionOutcome};
use domain_workflow::{ProcessingStarted, WorkflowReport, WorkflowResult};

use crate::error::ApiError;

/// Body of `POST /claims`
///
/// Amounts are plain decimals in `currency`. `available_balance` may be
/// omitted; it is then the coverage limit minus the amount already claimed.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitClaimRequest {
    #[validate(length(min = 1, max = 64))]
    pub claim_id: String,
    #[validate(length(min = 1, max = 200))]
    pub patient_name: String,
    #[validate(length(min = 1, max = 64))]
    pub policy_number: String,
    #[serde(default)]
    pub currency: Currency,
    pub claim_amount: Decimal,
    pub claim_date: NaiveDate,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub treatment_type: String,
    #[serde(default)]
    pub hospital: String,
    #[serde(default)]
    pub documents_available: BTreeSet<String>,
    pub policy_coverage_limit: Decimal,
    #[serde(default)]
    pub previously_claimed_amount: Decimal,
    pub available_balance: Option<Decimal>,
    #[validate(length(min = 4, max = 16))]
    pub policy_year: String,
}

impl SubmitClaimRequest {
    pub fn into_submission(self) -> Result<ClaimSubmission, ApiError> {
        let claim_id = ClaimId::new(self.claim_id).map_err(|e| ApiError::Validation(e.to_string()))?;
        let money = |amount: Decimal| Money::new(amount, self.currency);

        Ok(ClaimSubmission {
            claim_id,
            patient_name: self.patient_name,
            policy_number: self.policy_number,
            claim_amount: money(self.claim_amount),
            claim_date: self.claim_date,
            diagnosis: self.diagnosis,
            treatment_type: self.treatment_type,
            hospital: self.hospital,
            documents_available: self.documents_available,
            policy_coverage_limit: money(self.policy_coverage_limit),
            previously_claimed_amount: money(self.previously_claimed_amount),
            available_balance: self.available_balance.map(money),
            policy_year: self.policy_year,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub claim_id: ClaimId,
    pub patient_name: String,
    pub policy_number: String,
    pub status: ClaimStatus,
    pub claim_amount: Money,
    pub policy_coverage_limit: Money,
    pub available_balance: Money,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClaimRecord> for ClaimResponse {
    fn from(claim: ClaimRecord) -> Self {
        Self {
            claim_id: claim.id,
            patient_name: claim.patient_name,
            policy_number: claim.policy_number,
            status: claim.status,
            claim_amount: claim.claim_amount,
            policy_coverage_limit: claim.policy_coverage_limit,
            available_balance: claim.available_balance,
            submitted_at: claim.submitted_at,
            updated_at: claim.updated_at,
        }
    }
}

/// Body of `202 Accepted` from `POST /claims/:claim_id/process`
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessingStartedResponse {
    pub session_id: SessionId,
    pub claim_id: ClaimId,
    pub stream_url: String,
}

impl From<ProcessingStarted> for ProcessingStartedResponse {
    fn from(started: ProcessingStarted) -> Self {
        Self {
            stream_url: format!("/api/v1/sessions/{}/stream", started.session_id),
            session_id: started.session_id,
            claim_id: started.claim_id,
        }
    }
}

/// One past run of a claim
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub record_id: RecordId,
    pub decision: DecisionOutcome,
    pub approved_amount: Money,
    pub capabilities_participated: usize,
    pub generated_at: DateTime<Utc>,
}

impl From<&WorkflowResult> for HistoryEntry {
    fn from(result: &WorkflowResult) -> Self {
        Self {
            record_id: result.record_id,
            decision: result.decision.decision,
            approved_amount: result.decision.approved_amount,
            capabilities_participated: result.participation_count,
            generated_at: result.generated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub claim_id: ClaimId,
    pub runs: Vec<HistoryEntry>,
}

/// `GET /claims/:claim_id/result` returns the stored report
pub type ResultResponse = WorkflowReport;

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SubmitClaimRequest {
        serde_json::from_value(serde_json::json!({
            "claim_id": "CLM001-2024-LAKSHMI",
            "patient_name": "Lakshmi Menon",
            "policy_number": "POL-88-1200",
            "claim_amount": "75000",
            "claim_date": "2024-03-12",
            "policy_coverage_limit": "500000",
            "policy_year": "2024"
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_to_rupees() {
        let submission = request().into_submission().unwrap();
        assert_eq!(submission.claim_amount.currency(), Currency::INR);
        assert!(submission.available_balance.is_none());
        assert!(submission.previously_claimed_amount.is_zero());
    }

    #[test]
    fn test_blank_patient_name_fails_validation() {
        let mut request = request();
        request.patient_name = String::new();
        assert!(request.validate().is_err());
    }
}
