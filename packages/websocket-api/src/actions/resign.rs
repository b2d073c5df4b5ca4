use tracing::debug;

use shared::models::events::ServerEvent;
use shared::repositories::connection_repository::OutboundSender;

use crate::actions::{emit_game_ended, send_direct};
use crate::error::game_error_message;
use crate::state::AppState;

pub async fn handle_resign(
    state: &AppState,
    player_id: &str,
    tx: &OutboundSender,
    session_id: &str,
) {
    match state.game_session_service.resign(session_id, player_id).await {
        Ok(outcome) => emit_game_ended(state, &outcome).await,
        Err(e) => match game_error_message(&e) {
            Some(message) => send_direct(tx, &ServerEvent::Error { message }),
            None => debug!(
                "Dropping resignation against non-active session {} from {}",
                session_id, player_id
            ),
        },
    }
}
