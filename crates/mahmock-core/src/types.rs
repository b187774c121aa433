// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifiers and protocol constants used across the gateway.

use std::borrow::Borrow;
use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sync id of the handshake acknowledgement frame.
pub const HANDSHAKE_SYNC_ID: &str = "0";

/// Sync id marking a server-initiated push (not correlated to any request).
pub const PUSH_SYNC_ID: &str = "-1";

/// Key inside request content carrying the session token.
pub const SESSION_KEY_FIELD: &str = "sessionKey";

/// Number of random bytes in a session token before hex encoding.
const SESSION_TOKEN_BYTES: usize = 16;

/// Logical account (bot) identifier, the `qq` of the upstream protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque per-connection credential minted at handshake.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    /// Mint a fresh random token (16 bytes from the OS-seeded thread RNG, hex encoded).
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        SessionToken(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Lets token tables be queried with the raw `sessionKey` string.
impl Borrow<str> for SessionToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identity of one live connection; used for exact-instance unbinding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    pub fn new() -> Self {
        ConnectionId(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which surface a WebSocket connection was opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ChannelMode {
    /// `/all`: requests and pushes.
    All,
    /// `/message`: same session semantics as `/all`.
    Message,
    /// `/event`: pushes only, no session minted, inbound text ignored.
    Event,
}

impl ChannelMode {
    /// Whether connections in this mode get a session and request handling.
    pub fn accepts_requests(self) -> bool {
        !matches!(self, ChannelMode::Event)
    }
}

/// Health status reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Server task is running.
    Healthy,
    /// Server is not operational.
    Unhealthy(String),
}
