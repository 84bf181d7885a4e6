//! HTTP and WebSocket surface tests
//!
//! Status endpoints are exercised in-process through the axum router; the
//! signaling flow is exercised over a real socket bound to an ephemeral port.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use rtc_signaling_relay::config::Settings;
use rtc_signaling_relay::identity::RoomId;
use rtc_signaling_relay::server::{create_app, AppState};

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn state_with_rooms() -> AppState {
    let state = AppState::new(Settings::default());
    let (tx_a, _) = tokio::sync::mpsc::channel(1);
    let (tx_b, _) = tokio::sync::mpsc::channel(1);
    let a = state.lifecycle.open(tx_a);
    let b = state.lifecycle.open(tx_b);
    state.registry.join(&RoomId::from("lobby"), a.handle().clone());
    state.registry.join(&RoomId::from("lobby"), b.handle().clone());
    state
}

// =============================================================================
// Status endpoints
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = create_app(AppState::new(Settings::default()));
    let (status, body) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_rooms_snapshot_lists_non_empty_rooms() {
    let app = create_app(state_with_rooms());
    let (status, body) = get_json(app, "/rooms").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"lobby": {"id": "lobby", "clientCount": 2}}));
}

#[tokio::test]
async fn test_rooms_snapshot_empty() {
    let app = create_app(AppState::new(Settings::default()));
    let (_, body) = get_json(app, "/rooms").await;
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_get_room() {
    let state = state_with_rooms();

    let (status, body) = get_json(create_app(state.clone()), "/rooms/lobby").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clientCount"], 2);

    let (status, body) = get_json(create_app(state), "/rooms/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_stats() {
    let app = create_app(state_with_rooms());
    let (status, body) = get_json(app, "/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connections"]["total_connections"], 2);
    assert_eq!(body["rooms"]["total_rooms"], 1);
    assert_eq!(body["rooms"]["members"]["lobby"], 2);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = create_app(state_with_rooms());
    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("signaling_rooms_active"));
}

// =============================================================================
// End-to-end signaling over WebSocket
// =============================================================================

async fn spawn_server() -> (String, AppState) {
    let state = AppState::new(Settings::default());
    let app = create_app(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("ws://{}/ws", addr), state)
}

async fn send(client: &mut Client, value: Value) {
    client.send(Message::text(value.to_string())).await.unwrap();
}

async fn recv(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .unwrap();
        if msg.is_text() {
            return serde_json::from_str(msg.to_text().unwrap()).unwrap();
        }
    }
}

async fn wait_for_rooms(state: &AppState, expected: usize) {
    for _ in 0..100 {
        if state.registry.room_count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("room count never reached {}", expected);
}

#[tokio::test]
async fn test_websocket_signaling_flow() {
    let (url, state) = spawn_server().await;

    let (mut a, _) = connect_async(url.as_str()).await.unwrap();
    let (mut b, _) = connect_async(url.as_str()).await.unwrap();

    send(&mut a, json!({"event": "join_room", "payload": {"room": "r1"}})).await;
    assert_eq!(
        recv(&mut a).await,
        json!({"event": "existing_peers", "payload": {"peers": []}})
    );

    send(&mut b, json!({"event": "join_room", "payload": {"room": "r1"}})).await;
    let existing = recv(&mut b).await;
    assert_eq!(existing["event"], "existing_peers");
    let a_id = existing["payload"]["peers"][0].as_str().unwrap().to_string();

    let joined = recv(&mut a).await;
    assert_eq!(joined["event"], "peer_joined");
    let b_id = joined["payload"]["peerId"].as_str().unwrap().to_string();

    // Malformed and unknown frames are dropped without closing the socket
    send(&mut b, json!({"event": "offer", "payload": {"sdp": "no target"}})).await;
    send(&mut b, json!({"event": "wave", "payload": {}})).await;
    b.send(Message::text("not json")).await.unwrap();

    send(&mut b, json!({"event": "offer", "payload": {"target": a_id, "sdp": "X"}})).await;
    assert_eq!(
        recv(&mut a).await,
        json!({"event": "offer", "payload": {"target": a_id, "sdp": "X", "source": b_id}})
    );

    b.close(None).await.unwrap();
    assert_eq!(
        recv(&mut a).await,
        json!({"event": "peer_left", "payload": {"peerId": b_id}})
    );
    assert_eq!(state.registry.members(&RoomId::from("r1")).len(), 1);

    a.close(None).await.unwrap();
    wait_for_rooms(&state, 0).await;
}
