use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use shared::models::events::{ClientEvent, ServerEvent};

use crate::actions;
use crate::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// One task per connection: inbound frames and the outbound channel are
/// multiplexed in a single select loop, so events for a session are observed
/// and dispatched in arrival order.
pub async fn handle_socket(state: AppState, mut socket: WebSocket) {
    let connection_id = Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let mut player_id: Option<String> = None;

    info!("WebSocket connection established: {}", connection_id);

    loop {
        tokio::select! {
            Some(message) = rx.recv() => {
                if socket.send(Message::Text(message)).await.is_err() {
                    break;
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        let event: ClientEvent = match serde_json::from_str(&text) {
                            Ok(event) => event,
                            Err(e) => {
                                debug!(
                                    "Undecodable frame on connection {}: {}",
                                    connection_id, e
                                );
                                actions::send_direct(
                                    &tx,
                                    &ServerEvent::Error {
                                        message: format!("Invalid message: {}", e),
                                    },
                                );
                                continue;
                            }
                        };
                        actions::dispatch(&state, &connection_id, &tx, &mut player_id, event)
                            .await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        debug!("WebSocket error on connection {}: {}", connection_id, e);
                        break;
                    }
                }
            }
        }
    }

    info!("WebSocket connection closed: {}", connection_id);
    actions::disconnect::handle_disconnect(&state, &connection_id).await;
}
