use std::time::Instant;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::metrics::ConnectionMetrics;
use crate::server::AppState;
use crate::signaling::{InboundEvent, ServerEvent, Session};

/// WebSocket upgrade handler
#[tracing::instrument(name = "ws.upgrade", skip_all)]
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let max_bytes = state.settings.websocket.max_message_bytes;

    ws.max_message_size(max_bytes)
        .max_frame_size(max_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serve one established WebSocket connection until it closes
#[tracing::instrument(
    name = "ws.connection",
    skip_all,
    fields(connection_id = tracing::field::Empty, otel.kind = "server")
)]
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_start = Instant::now();

    let (tx, mut rx) = mpsc::channel::<ServerEvent>(state.settings.websocket.outbound_buffer);
    let mut session = state.lifecycle.open(tx);
    let connection_id = session.id().clone();
    tracing::Span::current().record("connection_id", tracing::field::display(&connection_id));

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Task for writing queued events to the WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match event.to_json() {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize event");
                    continue;
                }
            };

            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Inbound frames are routed here, on the task that owns the session
    loop {
        tokio::select! {
            frame = ws_receiver.next() => match frame {
                Some(Ok(msg)) => {
                    if !process_message(msg, &state, &mut session) {
                        break;
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "WebSocket receive error");
                    break;
                }
                None => break,
            },
            _ = &mut send_task => {
                tracing::debug!("Send task completed");
                break;
            }
        }
    }

    state.lifecycle.close(&mut session);
    send_task.abort();

    let duration = connection_start.elapsed().as_secs_f64();
    ConnectionMetrics::record_duration(duration);

    tracing::info!(duration_secs = duration, "WebSocket connection closed");
}

/// Process a received WebSocket frame.
/// Returns false if the connection should be closed
fn process_message(msg: Message, state: &AppState, session: &mut Session) -> bool {
    match msg {
        Message::Text(text) => {
            let event = InboundEvent::decode(text.as_str());
            state.router.route(session, event);
            true
        }
        Message::Binary(_) => {
            let event = InboundEvent::Malformed {
                reason: "binary frames are not supported".to_string(),
            };
            state.router.route(session, event);
            true
        }
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %session.id(), "Received close frame");
            false
        }
    }
}
