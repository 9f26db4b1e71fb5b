//! Adapters for the workflow ports
//!
//! # Available Adapters
//!
//! - **In-memory**: claim repository, result store and a static evidence
//!   collector, used by tests and when no database is configured
//! - **HTTP**: a remote capability service and a remote evidence service,
//!   both speaking JSON over reqwest
//!
//! PostgreSQL implementations of the stores live in `infra_db`.
//!
//! ```rust,ignore
//! let invoker: Arc<dyn CapabilityInvoker> =
//!     Arc::new(HttpCapabilityInvoker::new(HttpServiceConfig::new("http://analysis:8081"))?);
//! let mut registry = CapabilityRegistry::new();
//! registry.register_all(plan.capability_ids(), invoker);
//! ```

pub mod memory;
pub mod http;

pub use memory::{InMemoryClaimRepository, InMemoryResultStore, StaticEvidenceCollector};
pub use http::{HttpCapabilityInvoker, HttpEvidenceCollector, HttpServiceConfig};
