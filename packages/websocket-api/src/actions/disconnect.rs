use tracing::info;

use crate::actions::{broadcast_queue_sizes, emit_game_ended};
use crate::state::AppState;

/// Socket-close path. Unbinding is guarded by connection id: if the player
/// already reconnected on a fresh socket, this close is stale and touches
/// nothing. Otherwise the player leaves every queue and the disconnect
/// policy runs over their active sessions.
pub async fn handle_disconnect(state: &AppState, connection_id: &str) {
    let Some(player_id) = state
        .websocket_service
        .unbind_by_connection(connection_id)
        .await
    else {
        return;
    };

    info!("Player {} disconnected", player_id);

    match state.matchmaking_service.leave_queue(&player_id).await {
        Ok(affected) => broadcast_queue_sizes(state, &affected).await,
        Err(e) => tracing::error!(
            "Failed to dequeue disconnected player {}: {}",
            player_id,
            e
        ),
    }

    let outcomes = state.game_session_service.handle_disconnect(&player_id).await;
    for outcome in &outcomes {
        emit_game_ended(state, outcome).await;
    }
}
