//! Workflow results repository implementation
//!
//! Results are append-only. History is ordered by generation time, then by
//! insertion time for results generated in the same instant.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::ClaimId;
use domain_workflow::{WorkflowReport, WorkflowResult};

use crate::error::DatabaseError;

/// Repository for adjudication results
#[derive(Debug, Clone)]
pub struct WorkflowResultsRepository {
    pool: PgPool,
}

/// A row of the `workflow_results` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkflowResultRow {
    pub record_id: Uuid,
    pub claim_id: String,
    pub decision: String,
    pub generated_at: DateTime<Utc>,
    pub result: Json<WorkflowResult>,
}

impl WorkflowResultRow {
    pub fn into_result(self) -> WorkflowResult {
        self.result.0
    }
}

impl WorkflowResultsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends a result together with its rendered report
    pub async fn insert(&self, result: &WorkflowResult, report: &WorkflowReport) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO workflow_results (record_id, claim_id, decision, generated_at, result, report)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*result.record_id.as_uuid())
        .bind(result.claim_id.as_str())
        .bind(result.decision.decision.as_str())
        .bind(result.generated_at)
        .bind(Json(result))
        .bind(Json(report))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The most recent result for a claim
    pub async fn latest(&self, claim_id: &ClaimId) -> Result<WorkflowResultRow, DatabaseError> {
        sqlx::query_as::<_, WorkflowResultRow>(
            r#"
            SELECT record_id, claim_id, decision, generated_at, result
            FROM workflow_results
            WHERE claim_id = $1
            ORDER BY generated_at DESC, stored_at DESC
            LIMIT 1
            "#,
        )
        .bind(claim_id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("WorkflowResult", claim_id))
    }

    /// Every result for a claim, oldest first
    pub async fn history(&self, claim_id: &ClaimId) -> Result<Vec<WorkflowResultRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, WorkflowResultRow>(
            r#"
            SELECT record_id, claim_id, decision, generated_at, result
            FROM workflow_results
            WHERE claim_id = $1
            ORDER BY generated_at ASC, stored_at ASC
            "#,
        )
        .bind(claim_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
