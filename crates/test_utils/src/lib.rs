//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claims adjudicator test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built claims, evidence, logs and decisions
//! - `builders`: Builder patterns for test data construction
//! - `scripted`: Capability invokers with canned answers and latencies
//! - `database`: Optional PostgreSQL pool for storage tests
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod scripted;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use scripted::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
