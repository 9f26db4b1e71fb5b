//! Port Adapters
//!
//! PostgreSQL implementations of the workflow storage ports. Each adapter
//! wraps a repository and translates `DatabaseError`s into `PortError`s:
//!
//! - `DatabaseError::NotFound` -> `PortError::NotFound`
//! - `DatabaseError::DuplicateEntry` -> `PortError::Conflict`
//! - Connection problems -> `PortError::Connection` / `ServiceUnavailable`
//! - Other errors -> `PortError::Internal`
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_workflow::ClaimRepository;
//! use infra_db::adapters::PostgresClaimRepository;
//!
//! let claims: Arc<dyn ClaimRepository> = Arc::new(PostgresClaimRepository::new(pool));
//! ```

pub mod claims;
pub mod results;

pub use claims::PostgresClaimRepository;
pub use results::PostgresWorkflowResultStore;

use std::time::Instant;

use core_kernel::HealthCheckResult;
use sqlx::PgPool;

/// Runs `SELECT 1` to verify the pool can serve queries
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult::healthy(adapter_id, latency_ms),
        Err(e) => HealthCheckResult::unhealthy(adapter_id, latency_ms, format!("Database error: {}", e)),
    }
}
