//! Claims repository implementation

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use core_kernel::ClaimId;
use domain_claims::{ClaimRecord, ClaimStatus};

use crate::error::DatabaseError;

/// Repository for claim records
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

/// A row of the `claims` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    pub claim_id: String,
    pub status: String,
    pub record: Json<ClaimRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClaimRow {
    pub fn into_record(self) -> ClaimRecord {
        self.record.0
    }
}

impl ClaimsRepository {
    /// Creates a new ClaimsRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new claim
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::DuplicateEntry` if the claim id is taken
    pub async fn insert(&self, claim: &ClaimRecord) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO claims (claim_id, status, record, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(claim.id.as_str())
        .bind(claim.status.as_str())
        .bind(Json(claim))
        .bind(claim.submitted_at)
        .bind(claim.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DatabaseError::from(e) {
            DatabaseError::DuplicateEntry(_) => DatabaseError::duplicate("Claim", "claim_id", &claim.id),
            other => other,
        })?;
        Ok(())
    }

    /// Retrieves a claim by its identifier
    pub async fn get_by_id(&self, claim_id: &ClaimId) -> Result<ClaimRow, DatabaseError> {
        sqlx::query_as::<_, ClaimRow>(
            r#"
            SELECT claim_id, status, record, created_at, updated_at
            FROM claims
            WHERE claim_id = $1
            "#,
        )
        .bind(claim_id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Claim", claim_id))
    }

    /// Replaces a stored claim
    pub async fn update(&self, claim: &ClaimRecord) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE claims
            SET status = $2, record = $3, updated_at = $4
            WHERE claim_id = $1
            "#,
        )
        .bind(claim.id.as_str())
        .bind(claim.status.as_str())
        .bind(Json(claim))
        .bind(claim.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Claim", &claim.id));
        }
        Ok(())
    }

    /// Replaces a stored claim only if it is not already in progress
    ///
    /// The status check and the write are one statement, so two callers
    /// racing to start a run cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the claim does not exist and
    /// `DatabaseError::ConcurrentModification` if it is already in progress
    pub async fn update_unless_in_progress(&self, claim: &ClaimRecord) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE claims
            SET status = $2, record = $3, updated_at = $4
            WHERE claim_id = $1 AND status <> $5
            "#,
        )
        .bind(claim.id.as_str())
        .bind(claim.status.as_str())
        .bind(Json(claim))
        .bind(claim.updated_at)
        .bind(ClaimStatus::InProgress.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            self.get_by_id(&claim.id).await?;
            return Err(DatabaseError::concurrent_modification("Claim", &claim.id, "idle"));
        }
        Ok(())
    }
}
