// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire frames.
//!
//! Client -> Server:
//! ```json
//! {"syncId": "5", "command": "sendGroupMessage", "subCommand": null,
//!  "content": {"sessionKey": "…", "target": 1, "messageChain": [...]}}
//! ```
//!
//! Server -> Client:
//! ```json
//! {"syncId": "0",  "data": {"code": 0, "session": "…"}}   // handshake ack
//! {"syncId": "5",  "data": {...}}                          // response
//! {"syncId": "-1", "data": {"type": "GroupMessage", ...}}  // push
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use mahmock_core::types::{HANDSHAKE_SYNC_ID, PUSH_SYNC_ID, SESSION_KEY_FIELD};
use mahmock_core::{MahError, SessionToken};

/// A client request frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default)]
    pub sync_id: String,
    pub command: String,
    #[serde(default)]
    pub sub_command: Option<String>,
    #[serde(default)]
    pub content: Map<String, Value>,
}

impl Request {
    /// Decode one text frame.
    pub fn from_frame(text: &str) -> Result<Self, MahError> {
        serde_json::from_str(text).map_err(|e| MahError::parse("malformed request frame", e))
    }

    /// The `sessionKey` embedded in the content, if it is a string.
    pub fn session_key(&self) -> Option<&str> {
        self.content.get(SESSION_KEY_FIELD).and_then(Value::as_str)
    }
}

/// A server frame: a response, a push, or the handshake ack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub sync_id: String,
    pub data: Value,
}

impl Response {
    pub fn new(sync_id: impl Into<String>, data: Value) -> Self {
        Self {
            sync_id: sync_id.into(),
            data,
        }
    }

    /// Server-initiated push, not correlated to any request.
    pub fn push(data: Value) -> Self {
        Self::new(PUSH_SYNC_ID, data)
    }

    /// First frame on every session: carries the minted token.
    pub fn handshake(token: &SessionToken) -> Self {
        Self::new(
            HANDSHAKE_SYNC_ID,
            json!({"code": 0, "session": token.as_str()}),
        )
    }

    pub fn is_push(&self) -> bool {
        self.sync_id == PUSH_SYNC_ID
    }

    pub fn to_frame(&self) -> Result<String, MahError> {
        Ok(serde_json::to_string(self)?)
    }
}
