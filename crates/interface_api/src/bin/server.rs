//! Claims Adjudicator - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration (in-memory storage)
//! cargo run --bin claims-adjudicator
//!
//! # Run against PostgreSQL and a remote analysis service
//! API_ORCHESTRATION__DATABASE_URL=postgres://... \
//! API_ORCHESTRATION__CAPABILITY_SERVICE__BASE_URL=http://analysis:9000 \
//! cargo run --bin claims-adjudicator
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `API_ORCHESTRATION__CAPABILITY_TIMEOUT_SECS` - Per-capability timeout (default: 120)
//! * `API_ORCHESTRATION__DATABASE_URL` - PostgreSQL connection string
//! * `API_ORCHESTRATION__CAPABILITY_SERVICE__BASE_URL` - Capability service
//! * `API_ORCHESTRATION__EVIDENCE_SERVICE__BASE_URL` - Evidence service

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use interface_api::{bootstrap, config::ApiConfig, create_router, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SESSION_RETENTION: Duration = Duration::from_secs(60 * 60);
const PRUNE_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("failed to load configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        timeout_secs = config.orchestration.capability_timeout_secs,
        "Starting claims adjudicator"
    );

    let service = bootstrap::build_service(&config.orchestration)
        .await
        .context("failed to build processing service")?;
    let addr: SocketAddr = config.server_addr().parse().context("invalid server address")?;

    let state = AppState::new(service, config);
    spawn_session_pruner(state.clone());
    let app = create_router(state);

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Drops finished sessions once they are old enough; their results stay
/// available from the store.
fn spawn_session_pruner(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            let cutoff = chrono::Utc::now()
                - chrono::Duration::from_std(SESSION_RETENTION).unwrap_or_else(|_| chrono::Duration::hours(1));
            let removed = state.service.sessions().prune_finished(cutoff).await;
            if removed > 0 {
                tracing::debug!(removed, "Pruned finished sessions");
            }
        }
    });
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
