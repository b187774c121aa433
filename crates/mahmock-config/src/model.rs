// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the mahmock gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level mahmock configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MahmockConfig {
    /// WebSocket server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Demo event feed pushed to each new connection.
    #[serde(default)]
    pub feed: FeedConfig,
}

/// WebSocket server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind (0 picks a free port).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret clients must present as `verifyKey`.
    #[serde(default = "default_verify_key")]
    pub verify_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            verify_key: default_verify_key(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_verify_key() -> String {
    "TestOnly".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Demo feed: sample `GroupMessage` pushes sent to every new connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    /// Enable the feed.
    #[serde(default)]
    pub enabled: bool,

    /// Number of events pushed per connection.
    #[serde(default = "default_feed_count")]
    pub count: u64,

    /// Delay after the handshake before the first event.
    #[serde(default = "default_feed_delay_ms")]
    pub delay_ms: u64,

    /// Pause between events (0 sends back-to-back).
    #[serde(default)]
    pub interval_ms: u64,

    /// Group the sample messages appear to come from.
    #[serde(default = "default_feed_group_id")]
    pub group_id: i64,

    /// Member the sample messages appear to come from.
    #[serde(default = "default_feed_sender_id")]
    pub sender_id: i64,

    /// Text of each sample message.
    #[serde(default = "default_feed_text")]
    pub text: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            count: default_feed_count(),
            delay_ms: default_feed_delay_ms(),
            interval_ms: 0,
            group_id: default_feed_group_id(),
            sender_id: default_feed_sender_id(),
            text: default_feed_text(),
        }
    }
}

fn default_feed_count() -> u64 {
    100
}

fn default_feed_delay_ms() -> u64 {
    1000
}

fn default_feed_group_id() -> i64 {
    2
}

fn default_feed_sender_id() -> i64 {
    1
}

fn default_feed_text() -> String {
    "hello from mahmock".to_string()
}
