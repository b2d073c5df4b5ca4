use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use shared::models::events::GameStateView;

use crate::state::AppState;

/// Recovery payload for a reconnecting client: the live session it is party
/// to, plus whether a disconnect grace window is in effect and when it runs
/// out.
#[derive(Debug, Serialize)]
pub struct ActiveSessionResponse {
    pub session_id: String,
    pub game_state: GameStateView,
    pub grace_in_effect: bool,
    pub grace_expires_at: Option<DateTime<Utc>>,
}

pub async fn active_session(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<ActiveSessionResponse>, StatusCode> {
    match state.game_session_service.active_session_for(&player_id).await {
        Some(info) => Ok(Json(ActiveSessionResponse {
            session_id: info.session.session_id.clone(),
            game_state: GameStateView::from(&info.session),
            grace_in_effect: info.grace.is_some(),
            grace_expires_at: info.grace.map(|grace| grace.expires_at),
        })),
        None => Err(StatusCode::NOT_FOUND),
    }
}
