//! Scripted Capabilities
//!
//! Capability invokers that answer with canned text after a fixed delay,
//! fail, or never answer at all. Each records what it was shown so tests can
//! check what a capability could see of the conversation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use core_kernel::{CapabilityId, DomainPort};
use domain_claims::EvidenceKind;
use domain_workflow::{CapabilityError, CapabilityInvoker, CapabilityRegistry, CapabilityRequest, StagePlan};

use crate::fixtures::{IdFixtures, TextFixtures};

/// What a scripted capability does when invoked
#[derive(Debug, Clone)]
pub enum Script {
    Respond(String),
    Fail(String),
    /// Never completes; only the scheduler timeout ends it
    Hang,
    /// Panics with the message, like a buggy plugin
    Panic(String),
}

/// What a capability was given on one call
#[derive(Debug, Clone)]
pub struct ObservedCall {
    pub prior_capabilities: Vec<CapabilityId>,
    pub instructions: Option<String>,
    pub evidence_kinds: Vec<EvidenceKind>,
}

#[derive(Debug)]
pub struct ScriptedCapability {
    script: Script,
    delay: Duration,
    calls: Mutex<Vec<ObservedCall>>,
}

impl ScriptedCapability {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn responding(text: impl Into<String>) -> Self {
        Self::new(Script::Respond(text.into()))
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self::new(Script::Fail(reason.into()))
    }

    pub fn hanging() -> Self {
        Self::new(Script::Hang)
    }

    pub fn panicking(message: impl Into<String>) -> Self {
        Self::new(Script::Panic(message.into()))
    }

    /// Waits `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<ObservedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl DomainPort for ScriptedCapability {}

#[async_trait]
impl CapabilityInvoker for ScriptedCapability {
    async fn invoke(&self, request: CapabilityRequest<'_>) -> Result<String, CapabilityError> {
        self.calls.lock().unwrap().push(ObservedCall {
            prior_capabilities: request
                .prior_log
                .iter()
                .map(|result| result.capability_id.clone())
                .collect(),
            instructions: request.instructions.map(String::from),
            evidence_kinds: request.evidence.kinds(),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.script {
            Script::Respond(text) => Ok(text.clone()),
            Script::Fail(reason) => Err(CapabilityError::unavailable(request.capability_id, reason.clone())),
            Script::Hang => std::future::pending().await,
            Script::Panic(message) => panic!("{}", message),
        }
    }
}

/// Registry serving each `(id, capability)` pair
pub fn scripted_registry(entries: &[(&str, Arc<ScriptedCapability>)]) -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();
    for (id, capability) in entries {
        registry.register(IdFixtures::capability(id), Arc::clone(capability) as Arc<dyn CapabilityInvoker>);
    }
    registry
}

/// Registry for the standard plan: specialists say they found nothing, the
/// coordinator answers with `coordinator_text`
pub fn standard_registry(coordinator_text: &str) -> CapabilityRegistry {
    let plan = StagePlan::standard().unwrap();
    let mut registry = CapabilityRegistry::new();
    let specialist: Arc<dyn CapabilityInvoker> =
        Arc::new(ScriptedCapability::responding("Review complete. FRAUD INDICATOR: None"));
    registry.register_all(plan.capability_ids(), specialist);
    registry.register(
        IdFixtures::capability(domain_workflow::stage::capabilities::DECISION_COORDINATOR),
        Arc::new(ScriptedCapability::responding(coordinator_text)),
    );
    registry
}

/// Standard registry with an approving coordinator
pub fn approving_registry() -> CapabilityRegistry {
    standard_registry(TextFixtures::APPROVED_COORDINATOR)
}
