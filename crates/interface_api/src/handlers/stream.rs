//! Progress streams over server-sent events
//!
//! Each capability result is sent as a `capability` event in log order,
//! followed by a single `complete` event, after which the stream ends. A
//! client that reconnects gets the whole run again from the start.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::stream::{Stream, StreamExt};

use core_kernel::SessionId;
use domain_workflow::{ProcessingEvent, StreamTarget};

use crate::auth::{permissions, require_permission, TokenClaims};
use crate::handlers::claims::parse_claim_id;
use crate::{error::ApiError, AppState};

type EventStream = Sse<futures::stream::BoxStream<'static, Result<Event, Infallible>>>;

/// Streams the latest run of a claim, live or stored
pub async fn stream_claim(
    State(state): State<AppState>,
    Extension(user): Extension<TokenClaims>,
    Path(claim_id): Path<String>,
) -> Result<EventStream, ApiError> {
    require_permission(&user, permissions::CLAIM_READ)?;
    let target = StreamTarget::Claim(parse_claim_id(claim_id)?);
    open(&state, &target).await
}

/// Streams one processing session
pub async fn stream_session(
    State(state): State<AppState>,
    Extension(user): Extension<TokenClaims>,
    Path(session_id): Path<String>,
) -> Result<EventStream, ApiError> {
    require_permission(&user, permissions::CLAIM_READ)?;
    let session_id = session_id
        .parse::<SessionId>()
        .map_err(|e| ApiError::BadRequest(format!("invalid session id: {}", e)))?;
    open(&state, &StreamTarget::Session(session_id)).await
}

async fn open(state: &AppState, target: &StreamTarget) -> Result<EventStream, ApiError> {
    let events = state.service.stream_updates(target).await?;
    Ok(Sse::new(to_sse(events).boxed()).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    ))
}

fn to_sse(
    events: impl Stream<Item = ProcessingEvent> + Send + 'static,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    events.map(|event| {
        let sse = Event::default().event(event.name());
        let sse = match &event {
            ProcessingEvent::Capability { position, .. } => sse.id(position.to_string()),
            ProcessingEvent::Complete { .. } => sse,
        };
        Ok(sse.json_data(&event).unwrap_or_else(|e| {
            Event::default().event("error").data(e.to_string())
        }))
    })
}
