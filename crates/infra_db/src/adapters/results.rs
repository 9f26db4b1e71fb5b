//! PostgreSQL workflow result store adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use core_kernel::{ClaimId, DomainPort, HealthCheckResult, HealthCheckable, PortError, RecordId};
use domain_workflow::{ReportAssembler, WorkflowResult, WorkflowResultStore};

use crate::repositories::WorkflowResultsRepository;

/// PostgreSQL-backed implementation of [`WorkflowResultStore`]
///
/// The rendered report is stored next to each result so it can be served
/// or exported without reassembling it.
#[derive(Debug, Clone)]
pub struct PostgresWorkflowResultStore {
    repository: WorkflowResultsRepository,
    pool: PgPool,
}

impl PostgresWorkflowResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: WorkflowResultsRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresWorkflowResultStore {}

#[async_trait]
impl HealthCheckable for PostgresWorkflowResultStore {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-results").await
    }
}

#[async_trait]
impl WorkflowResultStore for PostgresWorkflowResultStore {
    #[instrument(skip_all, fields(claim_id = %result.claim_id, record_id = %result.record_id))]
    async fn store(&self, result: &WorkflowResult) -> Result<RecordId, PortError> {
        let report = ReportAssembler::report(result);
        self.repository.insert(result, &report).await?;
        info!(decision = %result.decision.decision, "Workflow result stored");
        Ok(result.record_id)
    }

    async fn get_latest(&self, claim_id: &ClaimId) -> Result<WorkflowResult, PortError> {
        let row = self.repository.latest(claim_id).await?;
        Ok(row.into_result())
    }

    async fn get_history(&self, claim_id: &ClaimId) -> Result<Vec<WorkflowResult>, PortError> {
        let rows = self.repository.history(claim_id).await?;
        Ok(rows.into_iter().map(|row| row.into_result()).collect())
    }
}
