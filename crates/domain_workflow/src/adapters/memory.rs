//! In-memory adapters

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use core_kernel::{ClaimId, DomainPort, HealthCheckResult, HealthCheckable, PortError, RecordId};
use domain_claims::{ClaimRecord, ClaimStatus, EvidenceBundle};

use crate::ports::{ClaimRepository, EvidenceCollector, WorkflowResultStore};
use crate::report::WorkflowResult;

/// Claims held in a map
#[derive(Debug, Default)]
pub struct InMemoryClaimRepository {
    claims: RwLock<HashMap<ClaimId, ClaimRecord>>,
}

impl InMemoryClaimRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryClaimRepository {}

#[async_trait]
impl HealthCheckable for InMemoryClaimRepository {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("memory_claims", 0)
    }
}

#[async_trait]
impl ClaimRepository for InMemoryClaimRepository {
    async fn insert(&self, claim: &ClaimRecord) -> Result<(), PortError> {
        let mut claims = self.claims.write().await;
        if claims.contains_key(&claim.id) {
            return Err(PortError::conflict(format!("claim {} already exists", claim.id)));
        }
        claims.insert(claim.id.clone(), claim.clone());
        Ok(())
    }

    async fn get(&self, claim_id: &ClaimId) -> Result<ClaimRecord, PortError> {
        self.claims
            .read()
            .await
            .get(claim_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Claim", claim_id))
    }

    async fn update(&self, claim: &ClaimRecord) -> Result<(), PortError> {
        let mut claims = self.claims.write().await;
        match claims.get_mut(&claim.id) {
            Some(existing) => {
                *existing = claim.clone();
                Ok(())
            }
            None => Err(PortError::not_found("Claim", &claim.id)),
        }
    }

    async fn begin_processing(&self, claim: &ClaimRecord) -> Result<(), PortError> {
        let mut claims = self.claims.write().await;
        match claims.get_mut(&claim.id) {
            Some(existing) if existing.status == ClaimStatus::InProgress => Err(PortError::conflict(format!(
                "claim {} is already being processed",
                claim.id
            ))),
            Some(existing) => {
                *existing = claim.clone();
                Ok(())
            }
            None => Err(PortError::not_found("Claim", &claim.id)),
        }
    }
}

/// Workflow results per claim, in the order they were stored
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    results: RwLock<HashMap<ClaimId, Vec<WorkflowResult>>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryResultStore {}

#[async_trait]
impl HealthCheckable for InMemoryResultStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("memory_results", 0)
    }
}

#[async_trait]
impl WorkflowResultStore for InMemoryResultStore {
    async fn store(&self, result: &WorkflowResult) -> Result<RecordId, PortError> {
        self.results
            .write()
            .await
            .entry(result.claim_id.clone())
            .or_default()
            .push(result.clone());
        Ok(result.record_id)
    }

    async fn get_latest(&self, claim_id: &ClaimId) -> Result<WorkflowResult, PortError> {
        self.results
            .read()
            .await
            .get(claim_id)
            .and_then(|history| history.last().cloned())
            .ok_or_else(|| PortError::not_found("WorkflowResult", claim_id))
    }

    async fn get_history(&self, claim_id: &ClaimId) -> Result<Vec<WorkflowResult>, PortError> {
        Ok(self
            .results
            .read()
            .await
            .get(claim_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Evidence registered ahead of time, per claim or as a shared default
#[derive(Debug, Default)]
pub struct StaticEvidenceCollector {
    bundles: RwLock<HashMap<ClaimId, EvidenceBundle>>,
    fallback: Option<EvidenceBundle>,
}

impl StaticEvidenceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `bundle` for every claim without its own evidence
    pub fn with_default(bundle: EvidenceBundle) -> Self {
        Self {
            bundles: RwLock::default(),
            fallback: Some(bundle),
        }
    }

    pub async fn insert(&self, claim_id: ClaimId, bundle: EvidenceBundle) {
        self.bundles.write().await.insert(claim_id, bundle);
    }
}

impl DomainPort for StaticEvidenceCollector {}

#[async_trait]
impl EvidenceCollector for StaticEvidenceCollector {
    async fn collect(&self, claim: &ClaimRecord) -> Result<EvidenceBundle, PortError> {
        if let Some(bundle) = self.bundles.read().await.get(&claim.id) {
            return Ok(bundle.clone());
        }
        self.fallback
            .clone()
            .ok_or_else(|| PortError::not_found("EvidenceBundle", &claim.id))
    }
}
