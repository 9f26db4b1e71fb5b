//! Workflow Ports
//!
//! The workflow reaches its collaborators only through these traits, so the
//! same service runs against in-memory stores in tests, PostgreSQL in
//! production, and HTTP services for evidence.
//!
//! # Usage
//!
//! ```rust,ignore
//! let service = ClaimProcessingService::new(
//!     engine,
//!     Arc::new(PostgresClaimRepository::new(pool.clone())),
//!     Arc::new(PostgresWorkflowResultStore::new(pool)),
//!     Arc::new(HttpEvidenceCollector::new(evidence_url)?),
//! );
//! ```

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, HealthCheckable, PortError, RecordId};
use domain_claims::{ClaimRecord, EvidenceBundle};

use crate::report::WorkflowResult;

/// Supplies the evidence bundle for a claim
#[async_trait]
pub trait EvidenceCollector: DomainPort {
    async fn collect(&self, claim: &ClaimRecord) -> Result<EvidenceBundle, PortError>;
}

/// Stores claims and their status
#[async_trait]
pub trait ClaimRepository: DomainPort + HealthCheckable {
    /// Inserts a new claim, failing with `Conflict` if the id is taken
    async fn insert(&self, claim: &ClaimRecord) -> Result<(), PortError>;

    async fn get(&self, claim_id: &ClaimId) -> Result<ClaimRecord, PortError>;

    /// Replaces an existing claim
    async fn update(&self, claim: &ClaimRecord) -> Result<(), PortError>;

    /// Stores `claim` as the start of a run in one step, failing with
    /// `Conflict` if the stored claim is already in progress
    async fn begin_processing(&self, claim: &ClaimRecord) -> Result<(), PortError>;
}

/// Keeps every workflow result ever produced
#[async_trait]
pub trait WorkflowResultStore: DomainPort + HealthCheckable {
    async fn store(&self, result: &WorkflowResult) -> Result<RecordId, PortError>;

    /// Most recent result for a claim, or `NotFound`
    async fn get_latest(&self, claim_id: &ClaimId) -> Result<WorkflowResult, PortError>;

    /// All results for a claim, oldest first
    async fn get_history(&self, claim_id: &ClaimId) -> Result<Vec<WorkflowResult>, PortError>;
}
