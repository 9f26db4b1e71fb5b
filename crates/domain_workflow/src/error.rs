//! Workflow errors

use core_kernel::PortError;
use domain_claims::{ClaimError, EvidenceKind};
use thiserror::Error;

/// Structural problems that stop a run before any stage executes
#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("Invalid claim: {0}")]
    InvalidClaim(String),

    #[error("Missing required evidence: {}", display_kinds(.0))]
    MissingEvidence(Vec<EvidenceKind>),
}

fn display_kinds(kinds: &[EvidenceKind]) -> String {
    kinds.iter().map(EvidenceKind::as_str).collect::<Vec<_>>().join(", ")
}

/// Errors surfaced by the workflow services
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Orchestration(#[from] OrchestrationError),

    #[error("Invalid stage plan: {0}")]
    InvalidPlan(String),

    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Claim {0} is already being processed")]
    AlreadyProcessing(String),
}

impl WorkflowError {
    pub fn invalid_plan(message: impl Into<String>) -> Self {
        WorkflowError::InvalidPlan(message.into())
    }

    /// Returns true if the error means the requested entity does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            WorkflowError::Port(err) => err.is_not_found(),
            WorkflowError::SessionNotFound(_) => true,
            _ => false,
        }
    }
}
