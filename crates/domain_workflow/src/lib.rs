//! Adjudication Workflow
//!
//! This crate drives a claim through the analysis pipeline and turns the
//! resulting conversation into a stored, auditable result.
//!
//! # Architecture
//!
//! ```text
//! ClaimProcessingService
//!     │  collects evidence, opens a session, spawns the run
//!     ▼
//! AdjudicationEngine
//!     │
//!     ├── StageScheduler ──► CapabilityRegistry ──► CapabilityInvoker (HTTP, scripted, ...)
//!     │        │
//!     │        └── ConversationLog (declared order) ──► RunObserver (session events)
//!     │
//!     ├── DecisionExtractor ──► FinancialCalculator
//!     │
//!     └── ReportAssembler ──► WorkflowResult ──► WorkflowResultStore
//! ```
//!
//! Only the members of a single parallel stage run concurrently. Their
//! results are buffered and appended in declared order once the whole group
//! has resolved, so the log never depends on which capability answered first.

pub mod capability;
pub mod stage;
pub mod scheduler;
pub mod report;
pub mod engine;
pub mod ports;
pub mod session;
pub mod service;
pub mod adapters;
pub mod error;

pub use capability::{
    CapabilityError, CapabilityInstructions, CapabilityInvoker, CapabilityRegistry, CapabilityRequest,
};
pub use stage::{ExecutionMode, StageDefinition, StagePlan};
pub use scheduler::{NoopObserver, RunObserver, StageScheduler};
pub use report::{ReportAssembler, WorkflowReport, WorkflowResult};
pub use engine::AdjudicationEngine;
pub use ports::{ClaimRepository, EvidenceCollector, WorkflowResultStore};
pub use session::{ProcessingEvent, ProcessingSession, SessionRegistry};
pub use service::{ClaimProcessingService, ProcessingStarted, StreamTarget};
pub use error::{OrchestrationError, WorkflowError};
