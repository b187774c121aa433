// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests against a real gateway over WebSocket.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use mahmock_core::{handler_fn, AccountId, MahError};
use mahmock_gateway::{Dispatcher, FeedSettings, GatewayConfig, MockGateway};

const TIMEOUT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(200);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

fn dispatcher() -> Dispatcher {
    Dispatcher::new()
        .with_handler(
            "echo",
            handler_fn(|content| async move { Ok::<_, MahError>(json!({"echo": content})) }),
        )
        .with_handler(
            "slow",
            handler_fn(|_| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Ok::<_, MahError>(json!({"slow": true}))
            }),
        )
        .with_handler(
            "fail",
            handler_fn(|_| async { Err::<Value, _>(MahError::handler("fail", "always")) }),
        )
}

async fn boot(feed: Option<FeedSettings>) -> (MockGateway, SocketAddr) {
    let config = GatewayConfig {
        port: 0,
        feed,
        ..GatewayConfig::default()
    };
    let gateway = MockGateway::new(config, dispatcher());
    let addr = gateway.start().await.expect("gateway starts");
    (gateway, addr)
}

async fn connect(addr: SocketAddr, path: &str, qq: i64) -> WsStream {
    let url = format!("ws://{addr}/{path}?qq={qq}&verifyKey=TestOnly");
    let (ws, _) = connect_async(url).await.expect("handshake succeeds");
    ws
}

async fn next_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("frame before timeout")
            .expect("stream open")
            .expect("valid frame");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("json frame");
        }
    }
}

/// Connect on `/all` and consume the ack, returning the session token.
async fn session(addr: SocketAddr, qq: i64) -> (WsStream, String) {
    let mut ws = connect(addr, "all", qq).await;
    let ack = next_json(&mut ws).await;
    assert_eq!(ack["syncId"], "0");
    assert_eq!(ack["data"]["code"], 0);
    let token = ack["data"]["session"].as_str().expect("session token").to_string();
    (ws, token)
}

async fn send(ws: &mut WsStream, frame: Value) {
    ws.send(Message::Text(frame.to_string().into()))
        .await
        .expect("send frame");
}

async fn assert_silent(ws: &mut WsStream) {
    assert!(
        timeout(QUIET, ws.next()).await.is_err(),
        "expected no frame"
    );
}

/// Poll until `check` holds, for state updated by connection teardown.
async fn eventually(check: impl Fn() -> bool) {
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn ack_is_first_frame_and_token_is_live() {
    let (gateway, addr) = boot(None).await;
    let (_ws, token) = session(addr, 42).await;

    assert_eq!(token.len(), 32);
    assert_eq!(gateway.sessions().account_of(&token), Some(AccountId(42)));
    eventually(|| gateway.connections().connections(AccountId(42)) == 1).await;
    gateway.shutdown().await.unwrap();
}

#[tokio::test]
async fn request_is_answered_with_its_sync_id() {
    let (gateway, addr) = boot(None).await;
    let (mut ws, token) = session(addr, 1).await;

    send(
        &mut ws,
        json!({"syncId": "7", "command": "echo", "subCommand": null,
               "content": {"sessionKey": token, "target": 3}}),
    )
    .await;
    let response = next_json(&mut ws).await;
    assert_eq!(response["syncId"], "7");
    assert_eq!(response["data"]["echo"]["target"], 3);
    gateway.shutdown().await.unwrap();
}

#[tokio::test]
async fn dropped_requests_get_no_response() {
    let (gateway, addr) = boot(None).await;
    let (mut ws, token) = session(addr, 1).await;

    // Unknown session, unmapped command, empty syncId, failing handler, garbage.
    send(&mut ws, json!({"syncId": "1", "command": "echo", "content": {"sessionKey": "nope"}})).await;
    send(&mut ws, json!({"syncId": "2", "command": "missing", "content": {"sessionKey": token}})).await;
    send(&mut ws, json!({"syncId": "", "command": "echo", "content": {"sessionKey": token}})).await;
    send(&mut ws, json!({"syncId": "3", "command": "fail", "content": {"sessionKey": token}})).await;
    ws.send(Message::Text("{not json".into())).await.unwrap();

    // The connection is still serving: only this one is answered.
    send(&mut ws, json!({"syncId": "4", "command": "echo", "content": {"sessionKey": token}})).await;
    let response = next_json(&mut ws).await;
    assert_eq!(response["syncId"], "4");
    assert_silent(&mut ws).await;
    gateway.shutdown().await.unwrap();
}

#[tokio::test]
async fn slow_handler_does_not_block_receipt() {
    let (gateway, addr) = boot(None).await;
    let (mut ws, token) = session(addr, 1).await;

    send(&mut ws, json!({"syncId": "slow", "command": "slow", "content": {"sessionKey": token}})).await;
    send(&mut ws, json!({"syncId": "fast", "command": "echo", "content": {"sessionKey": token}})).await;

    assert_eq!(next_json(&mut ws).await["syncId"], "fast");
    assert_eq!(next_json(&mut ws).await["syncId"], "slow");
    gateway.shutdown().await.unwrap();
}

#[tokio::test]
async fn same_account_connections_are_independent() {
    let (gateway, addr) = boot(None).await;
    let (mut first, first_token) = session(addr, 9).await;
    let (mut second, second_token) = session(addr, 9).await;
    assert_ne!(first_token, second_token);
    eventually(|| gateway.connections().connections(AccountId(9)) == 2).await;

    first.close(None).await.unwrap();
    eventually(|| {
        !gateway.sessions().contains(&first_token)
            && gateway.connections().connections(AccountId(9)) == 1
    })
    .await;
    assert!(gateway.sessions().contains(&second_token));

    send(
        &mut second,
        json!({"syncId": "s", "command": "echo", "content": {"sessionKey": second_token}}),
    )
    .await;
    assert_eq!(next_json(&mut second).await["syncId"], "s");

    // A token from a closed session is dead even on a live connection.
    send(
        &mut second,
        json!({"syncId": "x", "command": "echo", "content": {"sessionKey": first_token}}),
    )
    .await;
    assert_silent(&mut second).await;
    gateway.shutdown().await.unwrap();
}

#[tokio::test]
async fn emit_reaches_every_connection_of_the_account() {
    let (gateway, addr) = boot(None).await;
    let (mut a, _) = session(addr, 5).await;
    let (mut b, _) = session(addr, 5).await;
    let mut event_only = connect(addr, "event", 5).await;
    let (mut other, _) = session(addr, 6).await;
    eventually(|| gateway.connections().connections(AccountId(5)) == 3).await;

    let report = gateway
        .emit(AccountId(5), &json!({"type": "BotOnlineEvent", "qq": 5}))
        .await
        .unwrap();
    assert_eq!(report.delivered, 3);
    assert_eq!(report.failed, 0);

    for ws in [&mut a, &mut b, &mut event_only] {
        let push = next_json(ws).await;
        assert_eq!(push["syncId"], "-1");
        assert_eq!(push["data"]["type"], "BotOnlineEvent");
    }
    assert_silent(&mut other).await;
    gateway.shutdown().await.unwrap();
}

#[tokio::test]
async fn emit_does_not_wait_on_a_client_that_stopped_reading() {
    let (gateway, addr) = boot(None).await;
    let mut reader = connect(addr, "event", 1).await;
    let _stalled = connect(addr, "event", 1).await;
    eventually(|| gateway.connections().connections(AccountId(1)) == 2).await;

    let drain = tokio::spawn(async move { while let Some(Ok(_)) = reader.next().await {} });

    // Enough data to fill the socket buffers and the outbound queue of the stalled client.
    let blob = "x".repeat(256 * 1024);
    let mut failed = 0;
    for _ in 0..400 {
        let report = timeout(Duration::from_secs(2), gateway.emit(AccountId(1), &json!({"blob": blob})))
            .await
            .expect("emit returns while one client is stalled")
            .unwrap();
        assert!(report.delivered >= 1);
        failed += report.failed;
    }
    assert!(failed > 0, "stalled client should have dropped frames");

    drain.abort();
    gateway.shutdown().await.unwrap();
}

#[tokio::test]
async fn event_channel_has_no_session_and_ignores_requests() {
    let (gateway, addr) = boot(None).await;
    let mut ws = connect(addr, "event", 3).await;
    eventually(|| gateway.connections().connections(AccountId(3)) == 1).await;
    assert!(gateway.sessions().is_empty());

    send(&mut ws, json!({"syncId": "1", "command": "echo", "content": {}})).await;
    assert_silent(&mut ws).await;
    gateway.shutdown().await.unwrap();
}

#[tokio::test]
async fn bad_handshakes_are_refused_before_upgrade() {
    let (gateway, addr) = boot(None).await;

    for query in ["qq=1&verifyKey=wrong", "qq=1", "verifyKey=TestOnly", "qq=abc&verifyKey=TestOnly"] {
        let url = format!("ws://{addr}/all?{query}");
        assert!(connect_async(url).await.is_err(), "{query} should be refused");
    }
    assert!(gateway.sessions().is_empty());
    assert_eq!(gateway.connections().accounts(), 0);
    gateway.shutdown().await.unwrap();
}

#[tokio::test]
async fn concurrent_closes_leave_tables_empty() {
    let (gateway, addr) = boot(None).await;
    let mut sockets = Vec::new();
    for _ in 0..8 {
        sockets.push(session(addr, 77).await.0);
    }
    assert_eq!(gateway.sessions().count_for(AccountId(77)), 8);

    let closes: Vec<_> = sockets
        .into_iter()
        .map(|mut ws| tokio::spawn(async move { ws.close(None).await }))
        .collect();
    for close in closes {
        let _ = close.await;
    }

    eventually(|| gateway.sessions().is_empty() && gateway.connections().accounts() == 0).await;
    gateway.shutdown().await.unwrap();
}

#[tokio::test]
async fn feed_follows_the_ack() {
    let feed = FeedSettings {
        count: 3,
        delay: Duration::from_millis(10),
        ..FeedSettings::default()
    };
    let (gateway, addr) = boot(Some(feed)).await;
    let (mut ws, _token) = session(addr, 1).await;

    for _ in 0..3 {
        let push = next_json(&mut ws).await;
        assert_eq!(push["syncId"], "-1");
        assert_eq!(push["data"]["type"], "GroupMessage");
    }
    assert_silent(&mut ws).await;
    gateway.shutdown().await.unwrap();
}

#[tokio::test]
async fn health_endpoint_reports_live_counts() {
    let (gateway, addr) = boot(None).await;
    let (_ws, _token) = session(addr, 1).await;
    eventually(|| gateway.connections().total_connections() == 1).await;

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    assert!(raw.starts_with("HTTP/1.1 200"));
    let body = raw.split("\r\n\r\n").nth(1).expect("body");
    let health: Value = serde_json::from_str(body).expect("json body");
    assert_eq!(health["status"], "ok");
    assert_eq!(health["sessions"], 1);
    assert_eq!(health["connections"], 1);
    gateway.shutdown().await.unwrap();
}
