use tracing::info;

use shared::models::events::ServerEvent;
use shared::repositories::connection_repository::OutboundSender;

use crate::actions::send_direct;
use crate::state::AppState;

/// Binds this connection to an identity. Idempotent: authenticating again
/// rebinds in place, and a reconnecting player's outbound events follow the
/// new socket from here on.
pub async fn handle_authenticate(
    state: &AppState,
    connection_id: &str,
    tx: &OutboundSender,
    bound_player: &mut Option<String>,
    player_id: &str,
    wallet_address: Option<String>,
) {
    if player_id.is_empty() {
        send_direct(
            tx,
            &ServerEvent::Error {
                message: "Player id cannot be empty".to_string(),
            },
        );
        return;
    }

    // Switching identities on a live socket drops the old binding first so
    // the registry never holds two identities for one connection.
    if bound_player.as_deref().is_some_and(|old| old != player_id) {
        state
            .websocket_service
            .unbind_by_connection(connection_id)
            .await;
    }

    state
        .websocket_service
        .bind(player_id, connection_id, tx.clone())
        .await;
    *bound_player = Some(player_id.to_string());

    info!(
        "Connection {} authenticated as player {}",
        connection_id, player_id
    );

    send_direct(
        tx,
        &ServerEvent::Authenticated {
            player_id: player_id.to_string(),
            wallet_address,
        },
    );
}
