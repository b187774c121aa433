// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Demo feed: sample `GroupMessage` pushes for load generation.

use std::time::Duration;

use tokio::sync::mpsc;

use mahmock_core::{ConnectionId, MahError};
use mahmock_message::event::{Group, Member, Permission};
use mahmock_message::{Event, MessageChain, Segment};

use crate::protocol::Response;

/// Shape and pacing of the sample pushes.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub count: u64,
    pub delay: Duration,
    pub interval: Duration,
    pub group_id: i64,
    pub sender_id: i64,
    pub text: String,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            count: 100,
            delay: Duration::from_secs(1),
            interval: Duration::ZERO,
            group_id: 2,
            sender_id: 1,
            text: "hello from mahmock".to_string(),
        }
    }
}

impl FeedSettings {
    /// The `seq`-th sample event; its `Source` id is `seq`.
    pub fn sample_event(&self, seq: u64) -> Result<Event, MahError> {
        let chain = MessageChain::from_segments(vec![
            Segment::source(seq as i64, chrono::Utc::now().timestamp()),
            Segment::plain(self.text.clone()),
        ])
        .map_err(|e| MahError::Internal(e.to_string()))?;

        Ok(Event::GroupMessage {
            message_chain: chain,
            sender: Member {
                id: self.sender_id,
                member_name: "?".to_string(),
                permission: Permission::Member,
                group: Group {
                    id: self.group_id,
                    name: "??".to_string(),
                    permission: Permission::Member,
                },
                special_title: None,
            },
        })
    }
}

/// Push `settings.count` sample events into one connection's queue.
///
/// Stops early when the connection's queue is closed.
pub async fn run_feed(
    settings: FeedSettings,
    conn_id: ConnectionId,
    tx: mpsc::Sender<String>,
) -> Result<u64, MahError> {
    tokio::time::sleep(settings.delay).await;

    let mut sent = 0;
    for seq in 1..=settings.count {
        let event = settings.sample_event(seq)?;
        let frame = Response::push(serde_json::to_value(&event)?).to_frame()?;
        if tx.send(frame).await.is_err() {
            tracing::debug!(%conn_id, sent, "feed stopped, connection gone");
            return Ok(sent);
        }
        sent += 1;
        if !settings.interval.is_zero() {
            tokio::time::sleep(settings.interval).await;
        }
    }

    tracing::info!(%conn_id, sent, "feed complete");
    Ok(sent)
}
