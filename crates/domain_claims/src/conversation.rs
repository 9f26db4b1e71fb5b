//! Conversation log
//!
//! Every capability invocation of a run ends up here as a [`CapabilityResult`].
//! The log is append-only: a result's position is fixed when it is appended
//! and equals its declared place in the stage plan, regardless of which
//! parallel member finished first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CapabilityId, StageId};
use crate::error::ClaimError;

/// Lifecycle of a single invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityStatus {
    Pending,
    Running,
    Completed,
    FailedError,
    FailedTimeout,
}

impl CapabilityStatus {
    /// Returns true once the invocation can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CapabilityStatus::Completed | CapabilityStatus::FailedError | CapabilityStatus::FailedTimeout
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CapabilityStatus::FailedError | CapabilityStatus::FailedTimeout)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityStatus::Pending => "pending",
            CapabilityStatus::Running => "running",
            CapabilityStatus::Completed => "completed",
            CapabilityStatus::FailedError => "failed-error",
            CapabilityStatus::FailedTimeout => "failed-timeout",
        }
    }
}

impl std::fmt::Display for CapabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one capability invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityResult {
    pub capability_id: CapabilityId,
    pub stage_id: StageId,
    pub status: CapabilityStatus,
    /// Text produced by the capability; empty when the invocation failed
    pub artifact: String,
    /// Why the invocation failed, if it did
    pub failure: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CapabilityResult {
    pub fn completed(
        capability_id: CapabilityId,
        stage_id: StageId,
        artifact: impl Into<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            capability_id,
            stage_id,
            status: CapabilityStatus::Completed,
            artifact: artifact.into(),
            failure: None,
            started_at,
            finished_at,
        }
    }

    pub fn timed_out(
        capability_id: CapabilityId,
        stage_id: StageId,
        explanation: impl Into<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self::failure(capability_id, stage_id, CapabilityStatus::FailedTimeout, explanation, started_at, finished_at)
    }

    pub fn errored(
        capability_id: CapabilityId,
        stage_id: StageId,
        explanation: impl Into<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self::failure(capability_id, stage_id, CapabilityStatus::FailedError, explanation, started_at, finished_at)
    }

    fn failure(
        capability_id: CapabilityId,
        stage_id: StageId,
        status: CapabilityStatus,
        explanation: impl Into<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            capability_id,
            stage_id,
            status,
            artifact: String::new(),
            failure: Some(explanation.into()),
            started_at,
            finished_at,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == CapabilityStatus::Completed
    }

    /// Wall-clock time the invocation took, in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds().max(0)
    }
}

/// Ordered, append-only record of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    entries: Vec<CapabilityResult>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finished result and returns its position
    pub fn append(&mut self, result: CapabilityResult) -> Result<usize, ClaimError> {
        if !result.status.is_terminal() {
            return Err(ClaimError::NonTerminalResult {
                status: result.status.to_string(),
            });
        }
        self.entries.push(result);
        Ok(self.entries.len() - 1)
    }

    /// All results in append order
    pub fn all(&self) -> &[CapabilityResult] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<&CapabilityResult> {
        self.entries.get(position)
    }

    pub fn last(&self) -> Option<&CapabilityResult> {
        self.entries.last()
    }

    /// Most recent result produced by a capability
    pub fn latest_by_capability(&self, capability_id: &CapabilityId) -> Option<&CapabilityResult> {
        self.entries
            .iter()
            .rev()
            .find(|result| &result.capability_id == capability_id)
    }

    /// Results with the given status, in append order
    pub fn filter(&self, status: CapabilityStatus) -> impl Iterator<Item = &CapabilityResult> {
        self.entries.iter().filter(move |result| result.status == status)
    }

    /// Results visible to later capabilities: unavailable capabilities are left out
    pub fn visible_to_later_stages(&self) -> Vec<CapabilityResult> {
        self.entries
            .iter()
            .filter(|result| result.status != CapabilityStatus::FailedError)
            .cloned()
            .collect()
    }

    /// Number of capabilities that completed successfully
    pub fn participation_count(&self) -> usize {
        self.filter(CapabilityStatus::Completed).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
