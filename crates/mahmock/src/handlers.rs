// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Default command catalogue served by the binary.
//!
//! Outgoing messages are kept in an in-memory [`MessageStore`] so that
//! `recall` and `messageFromId` behave like the real bridge within one run.
//! Replies follow the bridge's `{"code", "msg", ...}` convention; a payload
//! that does not match the command's shape is a handler error.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use strum::Display;

use mahmock_core::{handler_fn, MahError};
use mahmock_gateway::Dispatcher;
use mahmock_message::{MessageChain, Segment};

/// Status codes used in replies.
mod code {
    pub const OK: i64 = 0;
    pub const NOT_FOUND: i64 = 5;
    pub const BAD_REQUEST: i64 = 400;
}

/// Which send command produced a stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MessageKind {
    FriendMessage,
    GroupMessage,
    TempMessage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub id: i64,
    pub kind: MessageKind,
    pub target: i64,
    /// Group of a temp message.
    pub group: Option<i64>,
    pub quote: Option<i64>,
    /// Starts with a `Source` carrying `id`.
    pub chain: MessageChain,
}

/// Messages kept by [`MessageStore::new`].
pub const DEFAULT_HISTORY: usize = 10_000;

/// The most recent messages sent during this run, keyed by message id.
///
/// Holds at most `capacity` ids; recording a message evicts the one that
/// fell out of the window, so older ids read as not found.
#[derive(Debug)]
pub struct MessageStore {
    messages: DashMap<i64, StoredMessage>,
    next_id: AtomicI64,
    capacity: i64,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY)
    }
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: DashMap::new(),
            next_id: AtomicI64::new(1),
            capacity: i64::try_from(capacity.max(1)).unwrap_or(i64::MAX),
        }
    }

    /// Assign an id, stamp a `Source`, and keep the message.
    pub fn record(
        &self,
        kind: MessageKind,
        target: i64,
        group: Option<i64>,
        quote: Option<i64>,
        chain: &MessageChain,
    ) -> Result<i64, MahError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut stored =
            MessageChain::from_segments(vec![Segment::source(id, chrono::Utc::now().timestamp())])
                .map_err(|e| MahError::Internal(e.to_string()))?;
        stored.append_chain(chain);

        self.messages.insert(
            id,
            StoredMessage {
                id,
                kind,
                target,
                group,
                quote,
                chain: stored,
            },
        );
        // Ids are sequential, so each record retires exactly one old id.
        if self.messages.remove(&(id - self.capacity)).is_some() {
            tracing::trace!(message_id = id - self.capacity, "message evicted from history");
        }
        Ok(id)
    }

    pub fn get(&self, id: i64) -> Option<StoredMessage> {
        self.messages.get(&id).map(|m| m.value().clone())
    }

    pub fn contains(&self, id: i64) -> bool {
        self.messages.contains_key(&id)
    }

    pub fn recall(&self, id: i64) -> Option<StoredMessage> {
        self.messages.remove(&id).map(|(_, m)| m)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessage {
    target: i64,
    #[serde(default)]
    quote: Option<i64>,
    message_chain: MessageChain,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendTempMessage {
    qq: i64,
    group: i64,
    #[serde(default)]
    quote: Option<i64>,
    message_chain: MessageChain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display)]
enum NudgeKind {
    Friend,
    Group,
    Stranger,
}

#[derive(Debug, Deserialize)]
struct SendNudge {
    target: i64,
    subject: i64,
    kind: NudgeKind,
}

#[derive(Debug, Deserialize)]
struct ByTarget {
    target: i64,
}

#[derive(Debug, Deserialize)]
struct ById {
    id: i64,
}

fn decode<T: DeserializeOwned>(command: &str, content: Value) -> Result<T, MahError> {
    serde_json::from_value(content).map_err(|e| MahError::handler(command, e.to_string()))
}

fn reply(code: i64, msg: &str) -> Value {
    json!({"code": code, "msg": msg})
}

/// Shared body of the three send commands.
fn send(
    store: &MessageStore,
    kind: MessageKind,
    target: i64,
    group: Option<i64>,
    quote: Option<i64>,
    chain: &MessageChain,
) -> Result<Value, MahError> {
    if chain.iter().next().is_none() {
        return Ok(reply(code::BAD_REQUEST, "message chain is empty"));
    }
    if let Some(quoted) = quote
        && !store.contains(quoted)
    {
        return Ok(reply(code::NOT_FOUND, "quoted message not found"));
    }

    let id = store.record(kind, target, group, quote, chain)?;
    tracing::info!(%kind, target_id = target, message_id = id, text = %chain.to_text(), "message sent");
    Ok(json!({"code": code::OK, "msg": "success", "messageId": id}))
}

/// Build the default command table over `store`.
pub fn builtin_dispatcher(store: Arc<MessageStore>) -> Dispatcher {
    let mut dispatcher = Dispatcher::new();

    dispatcher.register(
        "about",
        handler_fn(|_| async {
            Ok::<_, MahError>(json!({
                "code": code::OK,
                "msg": "",
                "data": {"version": concat!("mahmock-", env!("CARGO_PKG_VERSION"))}
            }))
        }),
    );

    let s = store.clone();
    dispatcher.register(
        "sendFriendMessage",
        handler_fn(move |content| {
            let store = s.clone();
            async move {
                let req: SendMessage = decode("sendFriendMessage", content)?;
                send(&store, MessageKind::FriendMessage, req.target, None, req.quote, &req.message_chain)
            }
        }),
    );

    let s = store.clone();
    dispatcher.register(
        "sendGroupMessage",
        handler_fn(move |content| {
            let store = s.clone();
            async move {
                let req: SendMessage = decode("sendGroupMessage", content)?;
                send(&store, MessageKind::GroupMessage, req.target, None, req.quote, &req.message_chain)
            }
        }),
    );

    let s = store.clone();
    dispatcher.register(
        "sendTempMessage",
        handler_fn(move |content| {
            let store = s.clone();
            async move {
                let req: SendTempMessage = decode("sendTempMessage", content)?;
                send(
                    &store,
                    MessageKind::TempMessage,
                    req.qq,
                    Some(req.group),
                    req.quote,
                    &req.message_chain,
                )
            }
        }),
    );

    dispatcher.register(
        "sendNudge",
        handler_fn(|content| async move {
            let req: SendNudge = decode("sendNudge", content)?;
            tracing::info!(target_id = req.target, subject = req.subject, kind = %req.kind, "nudge sent");
            Ok::<_, MahError>(reply(code::OK, "success"))
        }),
    );

    let s = store.clone();
    dispatcher.register(
        "recall",
        handler_fn(move |content| {
            let store = s.clone();
            async move {
                let req: ByTarget = decode("recall", content)?;
                Ok::<_, MahError>(match store.recall(req.target) {
                    Some(_) => reply(code::OK, "success"),
                    None => reply(code::NOT_FOUND, "message not found"),
                })
            }
        }),
    );

    let s = store;
    dispatcher.register(
        "messageFromId",
        handler_fn(move |content| {
            let store = s.clone();
            async move {
                let req: ById = decode("messageFromId", content)?;
                let Some(message) = store.get(req.id) else {
                    return Ok(reply(code::NOT_FOUND, "message not found"));
                };
                Ok::<_, MahError>(json!({
                    "code": code::OK,
                    "msg": "",
                    "data": {
                        "type": message.kind.to_string(),
                        "target": message.target,
                        "group": message.group,
                        "quote": message.quote,
                        "messageChain": message.chain.render()?,
                    }
                }))
            }
        }),
    );

    dispatcher
}
