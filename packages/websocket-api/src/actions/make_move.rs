use tracing::debug;

use shared::models::events::{GameStateView, ServerEvent};
use shared::models::move_request::MoveRequest;
use shared::repositories::connection_repository::OutboundSender;
use shared::services::game_session_service::TerminalOutcome;

use crate::actions::{emit_game_ended, send_direct};
use crate::error::game_error_message;
use crate::state::AppState;

/// Applies a move and fans the updated state out to both sides. A terminal
/// move additionally emits the `game_ended` snapshots.
pub async fn handle_make_move(
    state: &AppState,
    player_id: &str,
    tx: &OutboundSender,
    session_id: &str,
    request: &MoveRequest,
) {
    let outcome = match state
        .game_session_service
        .make_move(session_id, player_id, request)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            match game_error_message(&e) {
                Some(message) => send_direct(tx, &ServerEvent::Error { message }),
                None => debug!(
                    "Dropping move against non-active session {} from {}",
                    session_id, player_id
                ),
            }
            return;
        }
    };

    let session = &outcome.session;
    let game_state = GameStateView::from(session);
    let event = ServerEvent::MoveMade {
        session_id: session.session_id.clone(),
        game_move: outcome.record.clone(),
        game_state,
    };
    state
        .websocket_service
        .send_event(&session.white_id, &event)
        .await;
    state
        .websocket_service
        .send_event(&session.black_id, &event)
        .await;

    if let Some(result) = session.result.clone() {
        emit_game_ended(
            state,
            &TerminalOutcome {
                session: session.clone(),
                result,
            },
        )
        .await;
    }
}
