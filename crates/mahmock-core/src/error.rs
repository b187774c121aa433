// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the mahmock gateway.

use thiserror::Error;

/// The primary error type shared by the gateway, dispatcher, and command handlers.
#[derive(Debug, Error)]
pub enum MahError {
    /// The WebSocket handshake was refused (missing parameters or bad secret).
    #[error("handshake rejected: {reason}")]
    HandshakeRejected { reason: String },

    /// A frame, request body, or message chain could not be decoded.
    #[error("parse error: {message}")]
    Parse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Delivery to a single connection failed (queue full or closed).
    #[error("send failed for connection {conn_id}: {reason}")]
    Send { conn_id: String, reason: String },

    /// A command handler reported a failure.
    #[error("handler for `{command}` failed: {message}")]
    Handler { command: String, message: String },

    /// Configuration errors surfaced at runtime (not the startup diagnostics).
    #[error("configuration error: {0}")]
    Config(String),

    /// Server lifecycle errors (bind failure, serve loop failure).
    #[error("server error: {message}")]
    Server {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MahError {
    /// Build a [`MahError::Parse`] that keeps the underlying error as its source.
    pub fn parse<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MahError::Parse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Build a [`MahError::Handler`] for the given command.
    pub fn handler(command: impl Into<String>, message: impl Into<String>) -> Self {
        MahError::Handler {
            command: command.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for MahError {
    fn from(err: serde_json::Error) -> Self {
        MahError::parse(err.to_string(), err)
    }
}
