//! Service wiring
//!
//! Builds the processing service from configuration: HTTP capability and
//! evidence adapters when their services are configured, PostgreSQL
//! storage when a database URL is set, in-memory storage otherwise.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use core_kernel::{CoreError, PortError};
use domain_workflow::adapters::{
    HttpCapabilityInvoker, HttpEvidenceCollector, InMemoryClaimRepository, InMemoryResultStore,
    StaticEvidenceCollector,
};
use domain_workflow::{
    AdjudicationEngine, CapabilityRegistry, ClaimProcessingService, ClaimRepository, EvidenceCollector,
    StageScheduler, WorkflowError, WorkflowResultStore,
};
use infra_db::{DatabaseConfig, DatabaseError, PostgresClaimRepository, PostgresWorkflowResultStore};

use crate::config::OrchestrationConfig;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Invalid orchestration settings: {0}")]
    Settings(#[from] CoreError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Adapter(#[from] PortError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Builds the engine for the configured plan, timeout and instructions
pub fn build_engine(
    config: &OrchestrationConfig,
    registry: CapabilityRegistry,
) -> Result<AdjudicationEngine, BootstrapError> {
    let plan = config.plan()?;
    let scheduler = StageScheduler::new(Arc::new(registry))
        .with_timeout(config.capability_timeout())
        .with_instructions(config.instructions()?);
    Ok(AdjudicationEngine::new(scheduler, plan))
}

/// Registry serving every planned capability from the configured service
pub fn build_registry(config: &OrchestrationConfig) -> Result<CapabilityRegistry, BootstrapError> {
    let mut registry = CapabilityRegistry::new();
    match &config.capability_service {
        Some(service) => {
            let plan = config.plan()?;
            let invoker = Arc::new(HttpCapabilityInvoker::new(service.clone())?);
            registry.register_all(plan.capability_ids(), invoker);
            info!(base_url = %service.base_url, capabilities = registry.len(), "Capabilities served over HTTP");
        }
        None => warn!("No capability service configured; every capability will be unavailable"),
    }
    Ok(registry)
}

/// Builds the full processing service
pub async fn build_service(config: &OrchestrationConfig) -> Result<ClaimProcessingService, BootstrapError> {
    let engine = build_engine(config, build_registry(config)?)?;

    let evidence: Arc<dyn EvidenceCollector> = match &config.evidence_service {
        Some(service) => Arc::new(HttpEvidenceCollector::new(service.clone())?),
        None => {
            warn!("No evidence service configured; claims without registered evidence cannot be processed");
            Arc::new(StaticEvidenceCollector::new())
        }
    };

    let claims: Arc<dyn ClaimRepository>;
    let results: Arc<dyn WorkflowResultStore>;
    match &config.database_url {
        Some(url) => {
            let pool = infra_db::create_pool(DatabaseConfig::new(url.as_str())).await?;
            infra_db::run_migrations(&pool).await?;
            info!("Using PostgreSQL storage");
            claims = Arc::new(PostgresClaimRepository::new(pool.clone()));
            results = Arc::new(PostgresWorkflowResultStore::new(pool));
        }
        None => {
            info!("Using in-memory storage");
            claims = Arc::new(InMemoryClaimRepository::new());
            results = Arc::new(InMemoryResultStore::new());
        }
    }

    Ok(ClaimProcessingService::new(engine, claims, results, evidence))
}
