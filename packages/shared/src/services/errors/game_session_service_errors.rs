use crate::services::errors::chess_service_errors::ChessServiceError;

#[derive(Debug)]
pub enum GameSessionServiceError {
    SessionNotFound,
    NotAParticipant,
    /// The session already left `Active`; callers treat this as a no-op.
    SessionNotActive,
    NotYourTurn,
    ChessError(ChessServiceError),
}

impl std::fmt::Display for GameSessionServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameSessionServiceError::SessionNotFound => write!(f, "Game session not found"),
            GameSessionServiceError::NotAParticipant => {
                write!(f, "Player is not a participant in this game")
            }
            GameSessionServiceError::SessionNotActive => {
                write!(f, "Game session is no longer active")
            }
            GameSessionServiceError::NotYourTurn => write!(f, "Not your turn"),
            GameSessionServiceError::ChessError(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for GameSessionServiceError {}

impl From<ChessServiceError> for GameSessionServiceError {
    fn from(err: ChessServiceError) -> Self {
        GameSessionServiceError::ChessError(err)
    }
}
