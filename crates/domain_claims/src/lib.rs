//! Claims Adjudication Domain
//!
//! This crate holds everything the adjudicator knows about a single claim:
//! the submitted record and its status lifecycle, the evidence bundle, the
//! conversation log written by analysis capabilities, and the two pure
//! functions that turn that log into money: decision extraction and financial
//! reconciliation.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Submitted -> InProgress -> Approved | Rejected | Pending
//!                  ^                       |
//!                  +------ reprocess ------+
//! ```

pub mod claim;
pub mod evidence;
pub mod conversation;
pub mod decision;
pub mod extraction;
pub mod financial;
pub mod error;

pub use claim::{ClaimRecord, ClaimStatus, ClaimSubmission};
pub use evidence::{EvidenceBundle, EvidenceKind};
pub use conversation::{CapabilityResult, CapabilityStatus, ConversationLog};
pub use decision::{
    BalanceStatus, Decision, DecisionField, DecisionOutcome, DecisionSource, DecisionSummary,
    FraudIndicator, IndicatorCategory, RiskLevel, Severity,
};
pub use extraction::DecisionExtractor;
pub use financial::FinancialCalculator;
pub use error::ClaimError;
