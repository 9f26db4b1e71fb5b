//! Claims domain errors

use core_kernel::{CoreError, MoneyError};
use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid claim: {0}")]
    InvalidClaim(String),

    #[error("Invalid evidence: {0}")]
    InvalidEvidence(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Conversation log only accepts finished results, got {status}")]
    NonTerminalResult { status: String },

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ClaimError {
    pub fn invalid_claim(message: impl Into<String>) -> Self {
        ClaimError::InvalidClaim(message.into())
    }

    pub fn invalid_evidence(message: impl Into<String>) -> Self {
        ClaimError::InvalidEvidence(message.into())
    }
}
