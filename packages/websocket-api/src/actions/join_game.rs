use shared::models::events::{GameStateView, ServerEvent};
use shared::repositories::connection_repository::OutboundSender;

use crate::actions::send_direct;
use crate::error::game_error_message;
use crate::state::AppState;

/// Reconnect path: the connection is already rebound by `authenticate`;
/// this clears any grace window and replays the current state. No session
/// transition happens here.
pub async fn handle_join_game(
    state: &AppState,
    player_id: &str,
    tx: &OutboundSender,
    session_id: &str,
) {
    match state.game_session_service.rejoin(session_id, player_id).await {
        Ok(session) => {
            send_direct(
                tx,
                &ServerEvent::GameJoined {
                    session_id: session.session_id.clone(),
                    game_state: GameStateView::from(&session),
                },
            );
        }
        Err(e) => {
            if let Some(message) = game_error_message(&e) {
                send_direct(tx, &ServerEvent::Error { message });
            }
        }
    }
}
