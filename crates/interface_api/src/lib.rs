//! HTTP API Layer
//!
//! This crate provides the REST API for the claims adjudicator using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: claim submission, processing, results and SSE progress streams
//! - **Middleware**: Authentication, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Bootstrap**: Wires configured adapters into a `ClaimProcessingService`
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{bootstrap, create_router, AppState};
//!
//! let service = bootstrap::build_service(&config.orchestration).await?;
//! let app = create_router(AppState::new(service, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;
pub mod bootstrap;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_workflow::ClaimProcessingService;

use crate::config::ApiConfig;
use crate::handlers::{claims, health, stream};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClaimProcessingService>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(service: ClaimProcessingService, config: ApiConfig) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let claims_routes = Router::new()
        .route("/", post(claims::submit_claim))
        .route("/:claim_id", get(claims::get_claim))
        .route("/:claim_id/process", post(claims::start_processing))
        .route("/:claim_id/stream", get(stream::stream_claim))
        .route("/:claim_id/result", get(claims::get_result))
        .route("/:claim_id/history", get(claims::get_history));

    let session_routes = Router::new().route("/:session_id/stream", get(stream::stream_session));

    // Protected API routes; audit runs inside auth so it sees the caller
    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .nest("/sessions", session_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
