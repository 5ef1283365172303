//! Axum HTTP surface: chat, health and journal export, with body limits and
//! a whole-request timeout. The timeout is validated to sit above the
//! composer's turn deadline, so a slow turn still answers with its fallback.

mod handlers;

pub use handlers::{ChatBody, ChatResponse};
use handlers::{handle_chat, handle_export, handle_health};

use crate::app::wiring::{build_composer, open_journal};
use crate::config::Config;
use crate::journal::SqliteJournal;
use crate::pipeline::Composer;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB)
pub const MAX_BODY_SIZE: usize = 65_536;

const SESSION_SWEEP_SECS: u64 = 60;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub composer: Arc<Composer>,
    /// Present when the journal is enabled and opened cleanly.
    pub journal: Option<Arc<SqliteJournal>>,
    pub model: String,
}

/// Router with every route and layer, ready to serve.
pub fn build_router(state: AppState, request_timeout: Duration, cors_origins: &[String]) -> Router {
    let mut app = Router::new()
        .route("/chat", post(handle_chat))
        .route("/health", get(handle_health))
        .route("/export/full_conversations.csv", get(handle_export))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ));

    if cors_origins.iter().any(|origin| origin == "*") {
        app = app.layer(CorsLayer::permissive());
    } else if !cors_origins.is_empty() {
        let origins: Vec<_> = cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        );
    }

    app
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn run_gateway(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.gateway.host, config.gateway.port)
        .parse()
        .context("invalid gateway address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind gateway at {addr}"))?;
    run_gateway_with_listener(listener, config).await
}

/// Serve from a pre-bound listener.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    let journal = open_journal(&config).await;
    let composer = build_composer(&config, journal.clone())?;
    let state = AppState {
        composer: Arc::new(composer),
        journal,
        model: config.provider.model.clone(),
    };

    let local = listener.local_addr()?;
    println!("◆ {}", t!("gateway.listening", addr = local));
    println!("  POST /chat");
    println!("  GET  /health");
    println!("  GET  /export/full_conversations.csv");
    tracing::info!(%local, model = %state.model, "gateway started");

    let sweeper = spawn_session_sweeper(Arc::clone(&state.composer));
    let app = build_router(
        state,
        Duration::from_secs(config.gateway.request_timeout_secs),
        &config.gateway.cors_origins,
    );
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("gateway server failed");
    sweeper.abort();
    served
}

/// Periodically drop session contexts that have sat idle past their TTL.
fn spawn_session_sweeper(composer: Arc<Composer>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SESSION_SWEEP_SECS));
        loop {
            interval.tick().await;
            let evicted = composer.sessions().evict_idle();
            if evicted > 0 {
                tracing::debug!(
                    evicted,
                    remaining = composer.sessions().session_count(),
                    "evicted idle sessions"
                );
            }
        }
    })
}
