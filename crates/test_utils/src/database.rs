//! Database Test Helpers
//!
//! Storage tests run against a real PostgreSQL when `TEST_DATABASE_URL` is
//! set and are skipped otherwise.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Environment variable naming the test database
pub const TEST_DATABASE_URL_VAR: &str = "TEST_DATABASE_URL";

/// Connects to the test database and applies migrations, if one is configured
pub async fn test_pool() -> Option<PgPool> {
    let url = std::env::var(TEST_DATABASE_URL_VAR).ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&url)
        .await
        .ok()?;
    infra_db::run_migrations(&pool).await.ok()?;
    Some(pool)
}

/// Returns a pool or logs why the calling test is skipped
#[macro_export]
macro_rules! require_database {
    () => {
        match $crate::database::test_pool().await {
            Some(pool) => pool,
            None => {
                eprintln!("skipping: {} not set", $crate::database::TEST_DATABASE_URL_VAR);
                return;
            }
        }
    };
}
