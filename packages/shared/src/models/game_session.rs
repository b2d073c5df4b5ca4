use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const DEFAULT_MINUTES: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Active,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResultKind {
    Checkmate,
    Stalemate,
    Draw,
    Resignation,
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub kind: GameResultKind,
    pub winner: Option<String>,
    pub loser: Option<String>,
}

/// Per-side clock budget parsed from a bucket key such as "10+0".
///
/// "M+I" yields `(M*60 + I) * 1000` ms — the increment is folded into the
/// initial budget once, not added per move. A bare numeric key is minutes;
/// anything unparsable falls back to 10 minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeControl {
    pub key: String,
    pub initial_ms: u64,
}

impl TimeControl {
    pub fn parse(key: &str) -> Self {
        let initial_ms = match key.split_once('+') {
            Some((minutes, increment)) => {
                let minutes: u64 = minutes.trim().parse().unwrap_or(DEFAULT_MINUTES);
                let increment: u64 = increment.trim().parse().unwrap_or(0);
                (minutes * 60 + increment) * 1000
            }
            None => {
                let minutes: u64 = key.trim().parse().unwrap_or(DEFAULT_MINUTES);
                minutes * 60 * 1000
            }
        };

        TimeControl {
            key: key.to_string(),
            initial_ms,
        }
    }
}

/// One accepted move, retained for audit/replay and for the archive hand-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub notation: String,
    pub from_square: String,
    pub to_square: String,
    pub piece: String,
    pub fen_after: String,
    pub capture: bool,
    pub check: bool,
    pub checkmate: bool,
    pub played_at: DateTime<Utc>,
    pub offset_ms: u64,
}

/// Grace window left open for a disconnected player on a fresh game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraceInfo {
    pub player_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub session_id: String,
    pub white_id: String,
    pub black_id: String,
    pub time_control: TimeControl,
    pub fen_board: String,
    pub moves: Vec<MoveRecord>,
    pub status: GameStatus,
    pub result: Option<GameResult>,
    pub whose_turn: Color,
    pub in_check: Option<Color>,
    pub time_remaining_white_ms: u64,
    pub time_remaining_black_ms: u64,
    pub created_at: DateTime<Utc>,
    pub last_move_at: Option<DateTime<Utc>>,
    pub grace: Option<GraceInfo>,
}

impl GameSession {
    /// Sessions are born active: clocks run from creation.
    pub fn new(white_id: &str, black_id: &str, time_control: TimeControl) -> Self {
        let initial_ms = time_control.initial_ms;
        GameSession {
            session_id: Uuid::new_v4().to_string(),
            white_id: white_id.to_string(),
            black_id: black_id.to_string(),
            time_control,
            fen_board: STARTING_FEN.to_string(),
            moves: vec![],
            status: GameStatus::Active,
            result: None,
            whose_turn: Color::White,
            in_check: None,
            time_remaining_white_ms: initial_ms,
            time_remaining_black_ms: initial_ms,
            created_at: Utc::now(),
            last_move_at: None,
            grace: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == GameStatus::Active
    }

    pub fn color_of(&self, player_id: &str) -> Option<Color> {
        if self.white_id == player_id {
            Some(Color::White)
        } else if self.black_id == player_id {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn player_id(&self, color: Color) -> &str {
        match color {
            Color::White => &self.white_id,
            Color::Black => &self.black_id,
        }
    }

    pub fn opponent_of(&self, player_id: &str) -> Option<&str> {
        match self.color_of(player_id)? {
            Color::White => Some(&self.black_id),
            Color::Black => Some(&self.white_id),
        }
    }

    /// Charge the mover for the wall-clock interval since the previous move
    /// (or since creation for the first move). Clocks saturate at zero.
    pub fn deduct_clock(&mut self, mover: Color, now: DateTime<Utc>) {
        let since = self.last_move_at.unwrap_or(self.created_at);
        let elapsed_ms = (now - since).num_milliseconds().max(0) as u64;
        let remaining = match mover {
            Color::White => &mut self.time_remaining_white_ms,
            Color::Black => &mut self.time_remaining_black_ms,
        };
        *remaining = remaining.saturating_sub(elapsed_ms);
        self.last_move_at = Some(now);
    }

    /// The single terminal transition. An abandonment with no winner marks
    /// the degenerate stuck-game case and lands on `Abandoned`; every other
    /// outcome lands on `Completed`.
    pub fn terminate(&mut self, kind: GameResultKind, winner: Option<String>, loser: Option<String>) {
        self.status = match (kind, &winner) {
            (GameResultKind::Abandoned, None) => GameStatus::Abandoned,
            _ => GameStatus::Completed,
        };
        self.grace = None;
        self.result = Some(GameResult { kind, winner, loser });
    }
}
