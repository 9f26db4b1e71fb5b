//! Processing sessions and update streams
//!
//! Each started run gets a session. The session keeps the full event history
//! of the run in a `tokio::sync::watch` channel, so a subscriber that joins
//! late still replays every event from the beginning. A stream ends right
//! after the `complete` event.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};

use core_kernel::{ClaimId, RecordId, SessionId};
use domain_claims::{CapabilityResult, DecisionSummary};

use crate::report::WorkflowResult;
use crate::scheduler::RunObserver;

/// One entry of an update stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProcessingEvent {
    /// A capability result was appended at `position`
    Capability { position: usize, result: CapabilityResult },
    /// The run finished; always the last event
    Complete {
        record_id: RecordId,
        summary: DecisionSummary,
    },
}

impl ProcessingEvent {
    pub fn is_complete(&self) -> bool {
        matches!(self, ProcessingEvent::Complete { .. })
    }

    /// Name used for the SSE `event:` field
    pub fn name(&self) -> &'static str {
        match self {
            ProcessingEvent::Capability { .. } => "capability",
            ProcessingEvent::Complete { .. } => "complete",
        }
    }

    /// Replays a stored result as the events its run produced
    pub fn replay(result: &WorkflowResult) -> Vec<ProcessingEvent> {
        let mut events: Vec<ProcessingEvent> = result
            .log
            .all()
            .iter()
            .enumerate()
            .map(|(position, entry)| ProcessingEvent::Capability {
                position,
                result: entry.clone(),
            })
            .collect();
        events.push(ProcessingEvent::Complete {
            record_id: result.record_id,
            summary: result.decision.summary(),
        });
        events
    }
}

/// A live or finished run
#[derive(Debug)]
pub struct ProcessingSession {
    pub session_id: SessionId,
    pub claim_id: ClaimId,
    pub started_at: DateTime<Utc>,
    events: watch::Sender<Vec<ProcessingEvent>>,
}

impl ProcessingSession {
    fn new(claim_id: ClaimId) -> Self {
        let (events, _) = watch::channel(Vec::new());
        Self {
            session_id: SessionId::new_v7(),
            claim_id,
            started_at: Utc::now(),
            events,
        }
    }

    pub fn publish(&self, event: ProcessingEvent) {
        self.events.send_modify(|events| events.push(event));
    }

    /// Marks the run finished
    pub fn complete(&self, result: &WorkflowResult) {
        self.publish(ProcessingEvent::Complete {
            record_id: result.record_id,
            summary: result.decision.summary(),
        });
    }

    pub fn is_finished(&self) -> bool {
        self.events.borrow().last().is_some_and(ProcessingEvent::is_complete)
    }

    pub fn events(&self) -> Vec<ProcessingEvent> {
        self.events.borrow().clone()
    }

    /// Streams every event of the run from the first one
    pub fn subscribe(&self) -> BoxStream<'static, ProcessingEvent> {
        let receiver = self.events.subscribe();
        stream::unfold((receiver, 0usize, false), |(mut receiver, next, done)| async move {
            if done {
                return None;
            }
            loop {
                let event = receiver.borrow_and_update().get(next).cloned();
                match event {
                    Some(event) => {
                        let done = event.is_complete();
                        return Some((event, (receiver, next + 1, done)));
                    }
                    None => {
                        if receiver.changed().await.is_err() {
                            return None;
                        }
                    }
                }
            }
        })
        .boxed()
    }
}

impl RunObserver for ProcessingSession {
    fn on_appended(&self, position: usize, result: &CapabilityResult) {
        self.publish(ProcessingEvent::Capability {
            position,
            result: result.clone(),
        });
    }
}

/// Open sessions, indexed by id and by claim
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<ProcessingSession>>>,
    latest_by_claim: RwLock<HashMap<ClaimId, SessionId>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&self, claim_id: ClaimId) -> Arc<ProcessingSession> {
        let session = Arc::new(ProcessingSession::new(claim_id.clone()));
        self.sessions
            .write()
            .await
            .insert(session.session_id, Arc::clone(&session));
        self.latest_by_claim
            .write()
            .await
            .insert(claim_id, session.session_id);
        session
    }

    pub async fn get(&self, session_id: &SessionId) -> Option<Arc<ProcessingSession>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Most recently opened session for a claim
    pub async fn latest_for_claim(&self, claim_id: &ClaimId) -> Option<Arc<ProcessingSession>> {
        let session_id = *self.latest_by_claim.read().await.get(claim_id)?;
        self.get(&session_id).await
    }

    /// Drops finished sessions older than `cutoff`
    pub async fn prune_finished(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !(session.is_finished() && session.started_at < cutoff));
        let removed = before - sessions.len();
        drop(sessions);

        if removed > 0 {
            let sessions = self.sessions.read().await;
            self.latest_by_claim
                .write()
                .await
                .retain(|_, session_id| sessions.contains_key(session_id));
        }
        removed
    }
}
