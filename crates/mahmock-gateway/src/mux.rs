// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection multiplexer: account → live connections, with fan-out.
//!
//! Each connection is represented by the outbound queue its sender task
//! drains. Unbinding matches on [`ConnectionId`], so two connections that
//! look alike are never confused.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use mahmock_core::{AccountId, ConnectionId, MahError};

/// Outbound side of one live connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::Sender<String>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, sender: mpsc::Sender<String>) -> Self {
        Self { id, sender }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    /// Queue one text frame for this connection without waiting.
    ///
    /// A full queue means the client stopped reading; the frame is dropped
    /// rather than stalling the caller.
    pub fn send(&self, frame: String) -> Result<(), MahError> {
        self.sender.try_send(frame).map_err(|e| MahError::Send {
            conn_id: self.id.to_string(),
            reason: match e {
                TrySendError::Full(_) => "outbound queue full".to_string(),
                TrySendError::Closed(_) => "connection closed".to_string(),
            },
        })
    }
}

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

impl BroadcastReport {
    /// Connections the broadcast was attempted on.
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Concurrent account → connection-set table.
#[derive(Debug, Clone, Default)]
pub struct ConnectionMultiplexer {
    bindings: Arc<DashMap<AccountId, Vec<ConnectionHandle>>>,
}

impl ConnectionMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, account: AccountId, handle: ConnectionHandle) {
        tracing::debug!(%account, conn_id = %handle.id, "connection bound");
        self.bindings.entry(account).or_default().push(handle);
    }

    /// Remove exactly the connection `id` from `account`'s set.
    ///
    /// Returns whether it was bound. Empty sets are dropped from the table.
    pub fn unbind(&self, account: AccountId, id: &ConnectionId) -> bool {
        let removed = match self.bindings.get_mut(&account) {
            Some(mut set) => {
                let before = set.len();
                set.retain(|h| &h.id != id);
                set.len() != before
            }
            None => false,
        };
        self.bindings.remove_if(&account, |_, set| set.is_empty());
        if removed {
            tracing::debug!(%account, conn_id = %id, "connection unbound");
        }
        removed
    }

    /// Deliver `frame` to every connection bound to `account`.
    ///
    /// Senders are snapshotted first; one failed or full queue does not stop
    /// the rest, and a stalled client never blocks the broadcast.
    pub fn broadcast(&self, account: AccountId, frame: &str) -> BroadcastReport {
        let targets: Vec<ConnectionHandle> = match self.bindings.get(&account) {
            Some(set) => set.clone(),
            None => return BroadcastReport::default(),
        };

        let mut report = BroadcastReport::default();
        for handle in &targets {
            match handle.send(frame.to_owned()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(%account, "broadcast delivery failed: {e}");
                }
            }
        }
        report
    }

    /// Number of connections bound to `account`.
    pub fn connections(&self, account: AccountId) -> usize {
        self.bindings.get(&account).map_or(0, |set| set.len())
    }

    pub fn is_bound(&self, account: AccountId, id: &ConnectionId) -> bool {
        self.bindings
            .get(&account)
            .is_some_and(|set| set.iter().any(|h| &h.id == id))
    }

    /// Number of accounts with at least one connection.
    pub fn accounts(&self) -> usize {
        self.bindings.len()
    }

    pub fn total_connections(&self) -> usize {
        self.bindings.iter().map(|e| e.value().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> (ConnectionHandle, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        (ConnectionHandle::new(ConnectionId::new(), tx), rx)
    }

    #[tokio::test]
    async fn broadcast_survives_a_failed_connection() {
        let mux = ConnectionMultiplexer::new();
        let account = AccountId(1);
        let (first, mut rx1) = handle();
        let (second, rx2) = handle();
        let (third, mut rx3) = handle();
        mux.bind(account, first);
        mux.bind(account, second);
        mux.bind(account, third);
        drop(rx2);

        let report = mux.broadcast(account, "frame");
        assert_eq!(report, BroadcastReport { delivered: 2, failed: 1 });
        assert_eq!(rx1.recv().await.as_deref(), Some("frame"));
        assert_eq!(rx3.recv().await.as_deref(), Some("frame"));
    }

    #[tokio::test]
    async fn stalled_reader_does_not_block_broadcast() {
        let mux = ConnectionMultiplexer::new();
        let account = AccountId(2);
        let (reader, mut reader_rx) = handle();
        let (stalled_tx, _stalled_rx) = mpsc::channel(1);
        mux.bind(account, reader);
        mux.bind(account, ConnectionHandle::new(ConnectionId::new(), stalled_tx));

        // Fills the stalled queue; the reader drains as it goes.
        let first = mux.broadcast(account, "one");
        assert_eq!(first, BroadcastReport { delivered: 2, failed: 0 });
        assert_eq!(reader_rx.recv().await.as_deref(), Some("one"));

        for frame in ["two", "three"] {
            let report = mux.broadcast(account, frame);
            assert_eq!(report, BroadcastReport { delivered: 1, failed: 1 });
            assert_eq!(reader_rx.recv().await.as_deref(), Some(frame));
        }
    }

    #[test]
    fn send_reports_full_and_closed_queues() {
        let (tx, rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(ConnectionId::new(), tx);
        handle.send("a".into()).unwrap();
        let full = handle.send("b".into()).unwrap_err();
        assert!(full.to_string().contains("queue full"));

        drop(rx);
        let closed = handle.send("c".into()).unwrap_err();
        assert!(matches!(closed, MahError::Send { .. }));
        assert!(closed.to_string().contains("connection closed"));
    }

    #[test]
    fn broadcast_to_unknown_account_is_empty() {
        let mux = ConnectionMultiplexer::new();
        let report = mux.broadcast(AccountId(404), "x");
        assert_eq!(report.attempted(), 0);
    }

    #[test]
    fn unbind_removes_exact_instance_and_collects_empty_sets() {
        let mux = ConnectionMultiplexer::new();
        let account = AccountId(5);
        let (a, _rx_a) = handle();
        let (b, _rx_b) = handle();
        let (a_id, b_id) = (a.id().clone(), b.id().clone());
        mux.bind(account, a);
        mux.bind(account, b);

        assert!(mux.unbind(account, &a_id));
        assert!(!mux.unbind(account, &a_id));
        assert!(mux.is_bound(account, &b_id));
        assert_eq!(mux.connections(account), 1);

        assert!(mux.unbind(account, &b_id));
        assert_eq!(mux.accounts(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_unbinds_leave_nothing_behind() {
        let mux = ConnectionMultiplexer::new();
        let account = AccountId(77);
        let mut ids = Vec::new();
        let mut receivers = Vec::new();
        for _ in 0..32 {
            let (h, rx) = handle();
            ids.push(h.id().clone());
            receivers.push(rx);
            mux.bind(account, h);
        }

        let tasks: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let mux = mux.clone();
                tokio::spawn(async move { mux.unbind(account, &id) })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap());
        }
        assert_eq!(mux.total_connections(), 0);
        assert_eq!(mux.accounts(), 0);
    }
}
