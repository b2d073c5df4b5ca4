use serde::{Deserialize, Serialize};

use crate::models::game_session::{
    Color, GameResult, GameResultKind, GameSession, GameStatus, MoveRecord,
};
use crate::models::move_request::MoveRequest;

/// Inbound protocol events, decoded once at the gateway boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientEvent {
    Authenticate {
        player_id: String,
        wallet_address: Option<String>,
    },
    JoinQueue {
        time_control: String,
        rating: Option<i32>,
    },
    LeaveQueue,
    MakeMove {
        session_id: String,
        #[serde(rename = "move")]
        game_move: MoveRequest,
    },
    JoinGame {
        session_id: String,
    },
    Resign {
        session_id: String,
    },
    Ping,
}

/// Outbound protocol events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerEvent {
    Authenticated {
        player_id: String,
        wallet_address: Option<String>,
    },
    QueueJoined {
        queue_id: String,
        time_control: String,
    },
    QueueUpdate {
        time_control: String,
        queue_size: usize,
    },
    GameFound {
        session_id: String,
        opponent: String,
        color: Color,
    },
    GameJoined {
        session_id: String,
        game_state: GameStateView,
    },
    MoveMade {
        session_id: String,
        #[serde(rename = "move")]
        game_move: MoveRecord,
        game_state: GameStateView,
    },
    GameEnded {
        session_id: String,
        result: GameResultKind,
        winner: Option<String>,
        loser: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_winner: Option<bool>,
        game_state: GameStateView,
    },
    Error {
        message: String,
    },
    Pong,
}

/// Snapshot of a session as shipped to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateView {
    pub session_id: String,
    pub fen: String,
    pub status: GameStatus,
    pub whose_turn: Color,
    pub moves: Vec<MoveRecord>,
    pub time_remaining_white_ms: u64,
    pub time_remaining_black_ms: u64,
    pub is_over: bool,
    pub result: Option<GameResult>,
    pub in_check: bool,
    pub check_color: Option<Color>,
}

impl From<&GameSession> for GameStateView {
    fn from(session: &GameSession) -> Self {
        GameStateView {
            session_id: session.session_id.clone(),
            fen: session.fen_board.clone(),
            status: session.status,
            whose_turn: session.whose_turn,
            moves: session.moves.clone(),
            time_remaining_white_ms: session.time_remaining_white_ms,
            time_remaining_black_ms: session.time_remaining_black_ms,
            is_over: !session.is_active(),
            result: session.result.clone(),
            in_check: session.in_check.is_some(),
            check_color: session.in_check,
        }
    }
}
