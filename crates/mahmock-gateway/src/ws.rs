// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket endpoints and the per-connection loop.
//!
//! Each connection runs two tasks: a sender task draining the outbound queue
//! into the socket, and the receive loop below. Every request is handled on
//! its own task so a slow handler never stalls frame receipt.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use mahmock_core::{AccountId, ChannelMode, ConnectionId, SessionToken};

use crate::auth::HandshakeParams;
use crate::feed;
use crate::mux::ConnectionHandle;
use crate::protocol::{Request, Response as Frame};
use crate::server::GatewayState;

/// Outbound frames buffered per connection.
const OUTBOUND_QUEUE: usize = 256;

/// `GET /all`
pub async fn all_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HandshakeParams>,
    State(state): State<GatewayState>,
) -> Response {
    upgrade(ws, params, state, ChannelMode::All)
}

/// `GET /message`
pub async fn message_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HandshakeParams>,
    State(state): State<GatewayState>,
) -> Response {
    upgrade(ws, params, state, ChannelMode::Message)
}

/// `GET /event`
pub async fn event_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HandshakeParams>,
    State(state): State<GatewayState>,
) -> Response {
    upgrade(ws, params, state, ChannelMode::Event)
}

/// Authenticate, then upgrade. Rejected clients get a plain HTTP error.
fn upgrade(
    ws: WebSocketUpgrade,
    params: HandshakeParams,
    state: GatewayState,
    mode: ChannelMode,
) -> Response {
    match state.auth.verify(&params) {
        Ok(account) => ws.on_upgrade(move |socket| handle_socket(socket, state, account, mode)),
        Err(rejection) => {
            tracing::info!(%mode, reason = %rejection.reason(), "handshake rejected");
            rejection.into_response()
        }
    }
}

/// Removes a connection's session and binding when dropped.
///
/// Held by the receive loop so cleanup runs once on every exit path.
struct ConnectionLease {
    state: GatewayState,
    account: AccountId,
    conn_id: ConnectionId,
    session: Option<SessionToken>,
}

impl Drop for ConnectionLease {
    fn drop(&mut self) {
        if let Some(token) = self.session.take() {
            self.state.sessions.remove(&token);
        }
        self.state.mux.unbind(self.account, &self.conn_id);
        tracing::info!(account = %self.account, conn_id = %self.conn_id, "connection closed");
    }
}

async fn handle_socket(socket: WebSocket, state: GatewayState, account: AccountId, mode: ChannelMode) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let conn_id = ConnectionId::new();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);

    let sender_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let session = mode.accepts_requests().then(|| state.sessions.mint(account));
    let lease = ConnectionLease {
        state: state.clone(),
        account,
        conn_id: conn_id.clone(),
        session: session.clone(),
    };

    // The ack is queued before the binding exists, so no push can overtake it.
    if let Some(token) = &session {
        let queued = Frame::handshake(token)
            .to_frame()
            .map(|ack| tx.try_send(ack).is_ok());
        if !matches!(queued, Ok(true)) {
            tracing::warn!(%account, %conn_id, "failed to queue handshake ack");
            drop(lease);
            sender_task.abort();
            return;
        }
    }

    state
        .mux
        .bind(account, ConnectionHandle::new(conn_id.clone(), tx.clone()));
    tracing::info!(%account, %conn_id, %mode, "connection established");

    let mut tasks = JoinSet::new();
    if let Some(settings) = state.feed.clone() {
        let (feed_conn, feed_tx) = (conn_id.clone(), tx.clone());
        tasks.spawn(async move {
            if let Err(e) = feed::run_feed(settings, feed_conn.clone(), feed_tx).await {
                tracing::warn!(conn_id = %feed_conn, "feed failed: {e}");
            }
        });
    }

    loop {
        tokio::select! {
            incoming = ws_receiver.next() => {
                let Some(Ok(msg)) = incoming else { break };
                match msg {
                    Message::Text(text) if mode.accepts_requests() => {
                        handle_text(&state, &conn_id, &tx, &mut tasks, text.as_str());
                    }
                    Message::Close(_) => break,
                    _ => {} // Ping/pong answered by the tungstenite layer
                }
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = joined
                    && e.is_panic()
                {
                    tracing::error!(%conn_id, "request task panicked: {e}");
                }
            }
            _ = state.shutdown.cancelled() => break,
        }
    }

    tasks.abort_all();
    drop(lease);
    sender_task.abort();
}

/// Validate one text frame and hand it to a request task.
///
/// Frames without a sync id or a live session are dropped without a reply.
fn handle_text(
    state: &GatewayState,
    conn_id: &ConnectionId,
    tx: &mpsc::Sender<String>,
    tasks: &mut JoinSet<()>,
    text: &str,
) {
    let request = match Request::from_frame(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(%conn_id, "invalid request frame: {e}");
            return;
        }
    };

    if request.sync_id.is_empty() {
        tracing::debug!(%conn_id, command = %request.command, "request without syncId dropped");
        return;
    }
    if !request
        .session_key()
        .is_some_and(|key| state.sessions.contains(key))
    {
        tracing::debug!(%conn_id, sync_id = %request.sync_id, "request with unknown session dropped");
        return;
    }

    let dispatcher = state.dispatcher.clone();
    let tx = tx.clone();
    let conn_id = conn_id.clone();
    tasks.spawn(async move {
        let command = request.command.clone();
        let sync_id = request.sync_id.clone();
        match dispatcher.dispatch(request).await {
            Ok(Some(response)) => match response.to_frame() {
                Ok(frame) => {
                    if tx.send(frame).await.is_err() {
                        tracing::warn!(%conn_id, %sync_id, "response dropped, connection gone");
                    }
                }
                Err(e) => tracing::warn!(%conn_id, %command, "failed to encode response: {e}"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(%conn_id, %command, %sync_id, "handler failed: {e}"),
        }
    });
}
