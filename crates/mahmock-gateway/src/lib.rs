// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock mirai-api-http WebSocket gateway.
//!
//! [`MockGateway`] owns the session table and connection multiplexer, runs
//! the axum server as a background task, and exposes [`MockGateway::emit`]
//! for server-initiated pushes.

pub mod auth;
pub mod dispatch;
pub mod feed;
pub mod mux;
pub mod protocol;
pub mod server;
pub mod session;
pub mod ws;

use std::net::SocketAddr;

use serde::Serialize;
use tokio::sync::Mutex;

use mahmock_core::{AccountId, HealthStatus, MahError};

pub use crate::auth::AuthConfig;
pub use crate::dispatch::Dispatcher;
pub use crate::feed::FeedSettings;
pub use crate::mux::{BroadcastReport, ConnectionMultiplexer};
pub use crate::protocol::{Request, Response};
pub use crate::server::GatewayState;
pub use crate::session::SessionTable;

/// Gateway configuration.
///
/// Mirrors the `[server]` and `[feed]` sections of `mahmock-config` so the
/// gateway does not depend on the config crate.
#[derive(Clone)]
pub struct GatewayConfig {
    pub host: String,
    /// 0 binds a free port; see [`MockGateway::local_addr`].
    pub port: u16,
    pub verify_key: String,
    pub feed: Option<FeedSettings>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            verify_key: "TestOnly".to_string(),
            feed: None,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("verify_key", &"[redacted]")
            .field("feed", &self.feed)
            .finish()
    }
}

/// The mock gateway: server lifecycle plus the push path.
pub struct MockGateway {
    config: GatewayConfig,
    state: GatewayState,
    server_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl MockGateway {
    /// Create a gateway serving the commands in `dispatcher`.
    pub fn new(config: GatewayConfig, dispatcher: Dispatcher) -> Self {
        let mut state = GatewayState::new(AuthConfig::new(config.verify_key.clone()), dispatcher);
        state.feed = config.feed.clone();
        Self {
            config,
            state,
            server_handle: Mutex::new(None),
            local_addr: Mutex::new(None),
        }
    }

    /// Bind and start serving in the background. Returns the bound address.
    pub async fn start(&self) -> Result<SocketAddr, MahError> {
        let mut handle = self.server_handle.lock().await;
        if handle.is_some() {
            return Err(MahError::Internal("gateway already started".to_string()));
        }

        let listener = server::bind(&self.config.host, self.config.port).await?;
        let addr = listener.local_addr().map_err(|e| MahError::Server {
            message: format!("listener has no local address: {e}"),
            source: Some(Box::new(e)),
        })?;

        let state = self.state.clone();
        *handle = Some(tokio::spawn(async move {
            if let Err(e) = server::start_server(listener, state).await {
                tracing::error!("gateway server error: {e}");
            }
        }));
        *self.local_addr.lock().await = Some(addr);
        Ok(addr)
    }

    pub async fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().await
    }

    /// Push `payload` to every connection bound to `account`.
    pub async fn emit<T: Serialize + ?Sized>(
        &self,
        account: AccountId,
        payload: &T,
    ) -> Result<BroadcastReport, MahError> {
        let frame = Response::push(serde_json::to_value(payload)?).to_frame()?;
        let report = self.state.mux.broadcast(account, &frame);
        tracing::debug!(
            %account,
            delivered = report.delivered,
            failed = report.failed,
            "push emitted"
        );
        Ok(report)
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.state.sessions
    }

    pub fn connections(&self) -> &ConnectionMultiplexer {
        &self.state.mux
    }

    pub fn state(&self) -> &GatewayState {
        &self.state
    }

    pub async fn health_check(&self) -> HealthStatus {
        match self.server_handle.lock().await.as_ref() {
            Some(h) if !h.is_finished() => HealthStatus::Healthy,
            Some(_) => HealthStatus::Unhealthy("server task exited".to_string()),
            None => HealthStatus::Unhealthy("server not started".to_string()),
        }
    }

    /// Stop accepting, close every connection, and wait for the server task.
    pub async fn shutdown(&self) -> Result<(), MahError> {
        self.state.shutdown.cancel();
        let handle = self.server_handle.lock().await.take();
        if let Some(h) = handle {
            h.await
                .map_err(|e| MahError::Internal(format!("server task failed: {e}")))?;
        }
        Ok(())
    }
}
