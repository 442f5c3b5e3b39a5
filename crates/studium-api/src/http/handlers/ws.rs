//! WebSocket handler for study room presence and broadcast.
//!
//! The `/ws` endpoint upgrades an HTTP connection to a WebSocket. Once
//! connected, the handler:
//!
//! - **Forwards room events:** Drains the connection's outbound queue
//!   (filled by the [`PresenceEngine`] fan-out) and pushes every
//!   [`RoomEvent`] to the client as a JSON text frame.
//! - **Receives commands:** Parses incoming text frames as [`WsCommand`]
//!   and hands them to the engine.
//!
//! Malformed commands are logged and ignored; they never tear down the
//! connection. Dropping the socket (or the client going away) funnels into
//! one `on_disconnect` call, so departure events fire exactly once.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use studium_types::presence::ConnectionId;

use crate::state::AppState;

/// Outbound queue depth per connection. A client that falls this far
/// behind loses its oldest queued events rather than stalling the room.
const OUTBOUND_QUEUE_DEPTH: usize = 64;

/// Incoming command from a WebSocket client.
///
/// Clients send JSON-encoded text frames matching one of these variants.
/// Unknown or malformed messages are logged and ignored.
#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    /// Join a study room under a display name. Joining a second room
    /// leaves the first.
    JoinRoom { room_id: String, display_name: String },
    /// Broadcast a chat line to the current room.
    SendMessage { text: String },
    /// Keep-alive ping. Server responds with `{"type":"pong"}`.
    Ping,
}

/// Upgrade an HTTP request to a WebSocket connection for room presence.
///
/// This is mounted at `/ws` in the router.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// Core WebSocket connection handler.
///
/// Uses `tokio::select!` to multiplex between the engine's outbound queue
/// and incoming WebSocket messages from the client. This keeps both sender
/// and receiver in a single task, enabling bidirectional communication.
async fn handle_ws_connection(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = ConnectionId::new();
    let (outbound_tx, mut outbound_rx) = broadcast::channel(OUTBOUND_QUEUE_DEPTH);
    state.presence.on_connect(connection_id, outbound_tx);

    tracing::debug!(%connection_id, "WebSocket connection opened");

    loop {
        tokio::select! {
            // --- Branch 1: Forward room events to the WebSocket client ---
            event = outbound_rx.recv() => {
                match event {
                    Ok(event) => {
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                                    // Client disconnected
                                    break;
                                }
                            }
                            Err(err) => {
                                tracing::warn!("Failed to serialize RoomEvent: {err}");
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Queue overflowed; the oldest events were dropped.
                        tracing::warn!(%connection_id, skipped, "WebSocket client lagging, skipped events");
                    }
                    // Engine dropped the sender (connection was removed)
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            // --- Branch 2: Process commands from the WebSocket client ---
            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        process_command(&text, connection_id, &state, &mut ws_sender).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        // Client disconnected
                        break;
                    }
                    Some(Err(err)) => {
                        tracing::debug!("WebSocket receive error: {err}");
                        break;
                    }
                    // Ignore binary, ping, pong protocol frames (handled by axum/tungstenite)
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.presence.on_disconnect(connection_id);
    tracing::debug!(%connection_id, "WebSocket connection closed");
}

/// Parse and process a single command from the WebSocket client.
async fn process_command(
    text: &str,
    connection_id: ConnectionId,
    state: &AppState,
    ws_sender: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
) {
    let cmd: WsCommand = match serde_json::from_str(text) {
        Ok(cmd) => cmd,
        Err(err) => {
            tracing::warn!(
                raw = %text,
                error = %err,
                "Ignoring malformed WebSocket command"
            );
            return;
        }
    };

    match cmd {
        WsCommand::JoinRoom {
            room_id,
            display_name,
        } => {
            let room_id = room_id.trim();
            let display_name = display_name.trim();
            if room_id.is_empty() || display_name.is_empty() {
                tracing::warn!(%connection_id, "JoinRoom: empty room_id or display_name");
                return;
            }
            if let Err(err) = state.presence.on_join(connection_id, room_id, display_name) {
                tracing::warn!(%connection_id, error = %err, "JoinRoom failed");
            }
        }
        WsCommand::SendMessage { text } => {
            state.presence.on_send(connection_id, &text);
        }
        WsCommand::Ping => {
            let pong = r#"{"type":"pong"}"#;
            if ws_sender.send(Message::Text(pong.into())).await.is_err() {
                tracing::debug!("Failed to send pong (client disconnecting)");
            }
        }
    }
}
