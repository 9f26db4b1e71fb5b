//! PostgreSQL claim repository adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{ClaimId, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_claims::ClaimRecord;
use domain_workflow::ClaimRepository;

use crate::repositories::ClaimsRepository;

/// PostgreSQL-backed implementation of [`ClaimRepository`]
#[derive(Debug, Clone)]
pub struct PostgresClaimRepository {
    repository: ClaimsRepository,
    pool: PgPool,
}

impl PostgresClaimRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClaimsRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn repository(&self) -> &ClaimsRepository {
        &self.repository
    }
}

impl DomainPort for PostgresClaimRepository {}

#[async_trait]
impl HealthCheckable for PostgresClaimRepository {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-claims").await
    }
}

#[async_trait]
impl ClaimRepository for PostgresClaimRepository {
    #[instrument(skip_all, fields(claim_id = %claim.id))]
    async fn insert(&self, claim: &ClaimRecord) -> Result<(), PortError> {
        self.repository.insert(claim).await?;
        debug!("Claim stored");
        Ok(())
    }

    async fn get(&self, claim_id: &ClaimId) -> Result<ClaimRecord, PortError> {
        let row = self.repository.get_by_id(claim_id).await?;
        Ok(row.into_record())
    }

    #[instrument(skip_all, fields(claim_id = %claim.id, status = %claim.status))]
    async fn update(&self, claim: &ClaimRecord) -> Result<(), PortError> {
        self.repository.update(claim).await?;
        debug!("Claim updated");
        Ok(())
    }

    #[instrument(skip_all, fields(claim_id = %claim.id))]
    async fn begin_processing(&self, claim: &ClaimRecord) -> Result<(), PortError> {
        self.repository.update_unless_in_progress(claim).await?;
        debug!("Claim marked in progress");
        Ok(())
    }
}
