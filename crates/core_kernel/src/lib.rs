//! Core Kernel - Foundational types shared by the claims adjudicator
//!
//! This crate provides the building blocks used by every other crate:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers and validated codes
//! - Port infrastructure for swappable collaborators (evidence, capabilities, storage)

pub mod money;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Rate};
pub use identifiers::{SessionId, RecordId, ClaimId, CapabilityId, StageId};
pub use error::CoreError;
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
