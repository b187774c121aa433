// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mahmock serve`: wire config, segment registry, handlers, and gateway.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mahmock_config::{FeedConfig, MahmockConfig};
use mahmock_core::{HealthStatus, MahError};
use mahmock_gateway::{FeedSettings, GatewayConfig, MockGateway};

use crate::handlers::{builtin_dispatcher, MessageStore};
use crate::segments;

/// Run the gateway until SIGINT/SIGTERM.
pub async fn run_serve(config: MahmockConfig) -> Result<(), MahError> {
    init_tracing(&config.logging.level);

    match segments::registry()
        .map_err(|e| MahError::Config(e.to_string()))?
        .install_global()
    {
        Ok(()) => debug!("segment registry installed"),
        Err(e) => warn!("segment registry not installed: {e}"),
    }

    let store = Arc::new(MessageStore::new());
    let gateway = MockGateway::new(gateway_config(&config), builtin_dispatcher(store));
    let addr = gateway.start().await?;
    info!(%addr, feed = config.feed.enabled, "mahmock serving on ws://{addr}/all");

    let shutdown = install_signal_handler();
    shutdown.cancelled().await;

    info!("shutting down");
    gateway.shutdown().await?;
    if let HealthStatus::Unhealthy(reason) = gateway.health_check().await {
        debug!(%reason, "gateway stopped");
    }
    Ok(())
}

/// Map the loaded configuration onto the gateway's own config.
pub fn gateway_config(config: &MahmockConfig) -> GatewayConfig {
    GatewayConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        verify_key: config.server.verify_key.clone(),
        feed: config.feed.enabled.then(|| feed_settings(&config.feed)),
    }
}

fn feed_settings(feed: &FeedConfig) -> FeedSettings {
    FeedSettings {
        count: feed.count,
        delay: Duration::from_millis(feed.delay_ms),
        interval: Duration::from_millis(feed.interval_ms),
        group_id: feed.group_id,
        sender_id: feed.sender_id,
        text: feed.text.clone(),
    }
}

/// Cancelled on SIGINT (Ctrl+C) or SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                        _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                    }
                }
                Err(e) => {
                    warn!("failed to install SIGTERM handler: {e}");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
    });

    token
}

/// `RUST_LOG` wins; otherwise `mahmock*` crates log at `log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

fn default_filter(log_level: &str) -> String {
    let level = log_level.to_ascii_lowercase();
    ["mahmock", "mahmock_core", "mahmock_message", "mahmock_gateway", "mahmock_config"]
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .chain(std::iter::once("warn".to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_is_only_configured_when_enabled() {
        let mut config = MahmockConfig::default();
        assert!(gateway_config(&config).feed.is_none());

        config.feed.enabled = true;
        config.feed.delay_ms = 250;
        let feed = gateway_config(&config).feed.unwrap();
        assert_eq!(feed.delay, Duration::from_millis(250));
        assert_eq!(feed.count, 100);
    }

    #[test]
    fn server_section_maps_through() {
        let mut config = MahmockConfig::default();
        config.server.port = 9999;
        config.server.verify_key = "k".into();
        let gateway = gateway_config(&config);
        assert_eq!(gateway.port, 9999);
        assert_eq!(gateway.verify_key, "k");
    }

    #[test]
    fn default_filter_covers_workspace_crates() {
        let filter = default_filter("DEBUG");
        assert!(filter.starts_with("mahmock=debug,"));
        assert!(filter.contains("mahmock_gateway=debug"));
        assert!(filter.ends_with(",warn"));
    }
}
