// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use mahmock_core::MahError;

use crate::auth::AuthConfig;
use crate::dispatch::Dispatcher;
use crate::feed::FeedSettings;
use crate::mux::ConnectionMultiplexer;
use crate::session::SessionTable;
use crate::ws;

/// Process start bookkeeping for `/health`.
#[derive(Debug, Clone)]
pub struct HealthState {
    pub start_time: std::time::Instant,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            start_time: std::time::Instant::now(),
            started_at: chrono::Utc::now(),
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub sessions: SessionTable,
    pub mux: ConnectionMultiplexer,
    pub dispatcher: Arc<Dispatcher>,
    pub auth: AuthConfig,
    /// Demo feed started on every new connection, when set.
    pub feed: Option<FeedSettings>,
    pub health: HealthState,
    /// Cancelled to stop the server and close every connection.
    pub shutdown: CancellationToken,
}

impl GatewayState {
    pub fn new(auth: AuthConfig, dispatcher: Dispatcher) -> Self {
        Self {
            sessions: SessionTable::new(),
            mux: ConnectionMultiplexer::new(),
            dispatcher: Arc::new(dispatcher),
            auth,
            feed: None,
            health: HealthState::default(),
            shutdown: CancellationToken::new(),
        }
    }
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub started_at: String,
    pub sessions: usize,
    pub accounts: usize,
    pub connections: usize,
}

/// `GET /health` (unauthenticated).
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        started_at: state.health.started_at.to_rfc3339(),
        sessions: state.sessions.len(),
        accounts: state.mux.accounts(),
        connections: state.mux.total_connections(),
    })
}

/// Build the router:
/// - GET /all, /message (full sessions)
/// - GET /event (pushes only)
/// - GET /health
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/all", get(ws::all_handler))
        .route("/message", get(ws::message_handler))
        .route("/event", get(ws::event_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on an already-bound listener until `state.shutdown` is cancelled.
pub async fn start_server(listener: TcpListener, state: GatewayState) -> Result<(), MahError> {
    let addr = listener
        .local_addr()
        .map_err(|e| MahError::Server {
            message: format!("listener has no local address: {e}"),
            source: Some(Box::new(e)),
        })?;
    let shutdown = state.shutdown.clone();

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| MahError::Server {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway on {addr} stopped");
    Ok(())
}

/// Bind `host:port`, mapping failure to [`MahError::Server`].
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, MahError> {
    let addr = format!("{host}:{port}");
    TcpListener::bind(&addr).await.map_err(|e| MahError::Server {
        message: format!("failed to bind gateway to {addr}: {e}"),
        source: Some(Box::new(e)),
    })
}
