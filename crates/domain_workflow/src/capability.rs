//! Capability invocation port
//!
//! A capability is one specialized analysis task (fraud screening, medical
//! validation, the final coordinator, ...). The workflow does not know how a
//! capability reasons; it only hands it the claim, the evidence snapshot, the
//! conversation so far and its instructions, and expects text back.
//!
//! # Adapters
//!
//! - **HTTP**: a remote analysis service, see [`crate::adapters::HttpCapabilityInvoker`]
//! - **Scripted**: canned answers for tests, in the `test_utils` crate

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use core_kernel::{CapabilityId, DomainPort, StageId};
use domain_claims::{CapabilityResult, ClaimRecord, EvidenceBundle};

/// Why an invocation produced no artifact
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("Capability {capability_id} timed out after {timeout_ms}ms")]
    Timeout { capability_id: String, timeout_ms: u64 },

    #[error("Capability {capability_id} unavailable: {reason}")]
    Unavailable { capability_id: String, reason: String },
}

impl CapabilityError {
    pub fn timeout(capability_id: &CapabilityId, timeout: Duration) -> Self {
        CapabilityError::Timeout {
            capability_id: capability_id.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn unavailable(capability_id: &CapabilityId, reason: impl Into<String>) -> Self {
        CapabilityError::Unavailable {
            capability_id: capability_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Everything a capability sees for one invocation
#[derive(Debug, Clone, Copy)]
pub struct CapabilityRequest<'a> {
    pub capability_id: &'a CapabilityId,
    pub stage_id: &'a StageId,
    pub claim: &'a ClaimRecord,
    pub evidence: &'a EvidenceBundle,
    /// Results appended before this capability's stage started
    pub prior_log: &'a [CapabilityResult],
    pub instructions: Option<&'a str>,
    pub timeout: Duration,
}

/// Port for invoking a single capability
#[async_trait]
pub trait CapabilityInvoker: DomainPort {
    /// Runs the capability and returns its text artifact
    async fn invoke(&self, request: CapabilityRequest<'_>) -> Result<String, CapabilityError>;
}

/// Instruction text per capability, fixed for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct CapabilityInstructions {
    entries: Arc<BTreeMap<CapabilityId, String>>,
}

impl CapabilityInstructions {
    pub fn new(entries: BTreeMap<CapabilityId, String>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }

    pub fn get(&self, capability_id: &CapabilityId) -> Option<&str> {
        self.entries.get(capability_id).map(String::as_str)
    }
}

/// Maps capability ids to the invokers that serve them
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    invokers: BTreeMap<CapabilityId, Arc<dyn CapabilityInvoker>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an invoker, replacing any earlier one for the same id
    pub fn register(&mut self, capability_id: CapabilityId, invoker: Arc<dyn CapabilityInvoker>) {
        self.invokers.insert(capability_id, invoker);
    }

    /// Builder-style registration
    pub fn with(mut self, capability_id: CapabilityId, invoker: Arc<dyn CapabilityInvoker>) -> Self {
        self.register(capability_id, invoker);
        self
    }

    /// Serves every id in `capability_ids` with the same invoker
    pub fn register_all<'a>(
        &mut self,
        capability_ids: impl IntoIterator<Item = &'a CapabilityId>,
        invoker: Arc<dyn CapabilityInvoker>,
    ) {
        for capability_id in capability_ids {
            self.invokers.insert(capability_id.clone(), Arc::clone(&invoker));
        }
    }

    pub fn get(&self, capability_id: &CapabilityId) -> Option<Arc<dyn CapabilityInvoker>> {
        self.invokers.get(capability_id).cloned()
    }

    pub fn contains(&self, capability_id: &CapabilityId) -> bool {
        self.invokers.contains_key(capability_id)
    }

    pub fn len(&self) -> usize {
        self.invokers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invokers.is_empty()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("capabilities", &self.invokers.keys().collect::<Vec<_>>())
            .finish()
    }
}
