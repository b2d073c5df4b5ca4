pub mod authenticate;
pub mod disconnect;
pub mod join_game;
pub mod join_queue;
pub mod leave_queue;
pub mod make_move;
pub mod resign;

use tracing::{debug, error};

use shared::models::events::{ClientEvent, GameStateView, ServerEvent};
use shared::repositories::connection_repository::OutboundSender;
use shared::services::game_session_service::TerminalOutcome;

use crate::state::AppState;

/// Routes one decoded inbound event to its handler. Everything except
/// `authenticate` and `ping` requires a bound identity.
pub async fn dispatch(
    state: &AppState,
    connection_id: &str,
    tx: &OutboundSender,
    player_id: &mut Option<String>,
    event: ClientEvent,
) {
    match (event, player_id.clone()) {
        (
            ClientEvent::Authenticate {
                player_id: identity,
                wallet_address,
            },
            _,
        ) => {
            authenticate::handle_authenticate(
                state,
                connection_id,
                tx,
                player_id,
                &identity,
                wallet_address,
            )
            .await;
        }
        (ClientEvent::Ping, _) => send_direct(tx, &ServerEvent::Pong),
        (_, None) => {
            debug!(
                "Rejecting event from unauthenticated connection {}",
                connection_id
            );
            send_direct(
                tx,
                &ServerEvent::Error {
                    message: "Authentication required".to_string(),
                },
            );
        }
        (
            ClientEvent::JoinQueue {
                time_control,
                rating,
            },
            Some(player_id),
        ) => {
            join_queue::handle_join_queue(state, &player_id, tx, &time_control, rating).await;
        }
        (ClientEvent::LeaveQueue, Some(player_id)) => {
            leave_queue::handle_leave_queue(state, &player_id, tx).await;
        }
        (
            ClientEvent::MakeMove {
                session_id,
                game_move,
            },
            Some(player_id),
        ) => {
            make_move::handle_make_move(state, &player_id, tx, &session_id, &game_move).await;
        }
        (ClientEvent::JoinGame { session_id }, Some(player_id)) => {
            join_game::handle_join_game(state, &player_id, tx, &session_id).await;
        }
        (ClientEvent::Resign { session_id }, Some(player_id)) => {
            resign::handle_resign(state, &player_id, tx, &session_id).await;
        }
    }
}

/// Sends straight down this connection's channel, bypassing the identity
/// registry. Used for replies that must reach the requesting socket even
/// before (or without) authentication.
pub fn send_direct(tx: &OutboundSender, event: &ServerEvent) {
    match serde_json::to_string(event) {
        Ok(message) => {
            let _ = tx.send(message);
        }
        Err(e) => error!("Failed to serialize outbound event: {}", e),
    }
}

/// Broadcasts the current size of each affected bucket to every connection.
pub async fn broadcast_queue_sizes(state: &AppState, buckets: &[String]) {
    for bucket in buckets {
        let queue_size = state.matchmaking_service.queue_size(bucket).await;
        state
            .websocket_service
            .broadcast_event(&ServerEvent::QueueUpdate {
                time_control: bucket.clone(),
                queue_size,
            })
            .await;
    }
}

/// Emits the terminal snapshot: one personalized `game_ended` per bound
/// identity carrying that side's `is_winner`, then a neutral copy on the
/// session channel as a delivery fallback.
pub async fn emit_game_ended(state: &AppState, outcome: &TerminalOutcome) {
    let session = &outcome.session;
    let result = &outcome.result;
    let game_state = GameStateView::from(session);
    let players = [session.white_id.as_str(), session.black_id.as_str()];

    for player in players {
        let event = ServerEvent::GameEnded {
            session_id: session.session_id.clone(),
            result: result.kind,
            winner: result.winner.clone(),
            loser: result.loser.clone(),
            is_winner: Some(result.winner.as_deref() == Some(player)),
            game_state: game_state.clone(),
        };
        state.websocket_service.send_event(player, &event).await;
    }

    let fallback = ServerEvent::GameEnded {
        session_id: session.session_id.clone(),
        result: result.kind,
        winner: result.winner.clone(),
        loser: result.loser.clone(),
        is_winner: None,
        game_state,
    };
    for player in players {
        state.websocket_service.send_event(player, &fallback).await;
    }
}
