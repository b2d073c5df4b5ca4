use tracing::{error, info};

use shared::models::events::ServerEvent;
use shared::models::game_session::Color;
use shared::repositories::connection_repository::OutboundSender;

use crate::actions::{broadcast_queue_sizes, send_direct};
use crate::error::matchmaking_error_message;
use crate::state::AppState;

/// Enqueues the player and, when the synchronous scan pairs them, creates
/// the session and tells both sides which color they hold.
pub async fn handle_join_queue(
    state: &AppState,
    player_id: &str,
    tx: &OutboundSender,
    time_control: &str,
    rating: Option<i32>,
) {
    let outcome = match state
        .matchmaking_service
        .join_queue(player_id, time_control, rating)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Failed to join queue for player {}: {}", player_id, e);
            send_direct(
                tx,
                &ServerEvent::Error {
                    message: matchmaking_error_message(&e),
                },
            );
            return;
        }
    };

    send_direct(
        tx,
        &ServerEvent::QueueJoined {
            queue_id: outcome.entry.queue_id.clone(),
            time_control: time_control.to_string(),
        },
    );
    broadcast_queue_sizes(state, &outcome.affected_buckets).await;

    let Some(pair) = outcome.matched else {
        return;
    };

    let session = state
        .game_session_service
        .create_session(&pair.white, &pair.black)
        .await;
    info!(
        "Match found in queue {}: session {}",
        time_control, session.session_id
    );

    state
        .websocket_service
        .send_event(
            &pair.white.player_id,
            &ServerEvent::GameFound {
                session_id: session.session_id.clone(),
                opponent: pair.black.player_id.clone(),
                color: Color::White,
            },
        )
        .await;
    state
        .websocket_service
        .send_event(
            &pair.black.player_id,
            &ServerEvent::GameFound {
                session_id: session.session_id.clone(),
                opponent: pair.white.player_id.clone(),
                color: Color::Black,
            },
        )
        .await;

    // Both entries just left the bucket.
    broadcast_queue_sizes(state, std::slice::from_ref(&session.time_control.key)).await;
}
