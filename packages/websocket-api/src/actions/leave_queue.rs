use tracing::error;

use shared::models::events::ServerEvent;
use shared::repositories::connection_repository::OutboundSender;

use crate::actions::{broadcast_queue_sizes, send_direct};
use crate::error::matchmaking_error_message;
use crate::state::AppState;

pub async fn handle_leave_queue(state: &AppState, player_id: &str, tx: &OutboundSender) {
    match state.matchmaking_service.leave_queue(player_id).await {
        Ok(affected) => broadcast_queue_sizes(state, &affected).await,
        Err(e) => {
            error!("Failed to leave queue for player {}: {}", player_id, e);
            send_direct(
                tx,
                &ServerEvent::Error {
                    message: matchmaking_error_message(&e),
                },
            );
        }
    }
}
