//! Infrastructure Database Layer
//!
//! PostgreSQL storage for the claims adjudicator using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Repositories own the SQL and
//! the row types; adapters implement the workflow ports on top of them and
//! translate database errors into `PortError`s.
//!
//! Claim records and workflow results are kept as JSONB documents, so a
//! stored result reads back exactly as it was assembled. Results are
//! append-only: every run adds a row and nothing is ever updated.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresWorkflowResultStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/claims")).await?;
//! run_migrations(&pool).await?;
//! let results = PostgresWorkflowResultStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::{PostgresClaimRepository, PostgresWorkflowResultStore};
