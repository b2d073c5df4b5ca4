use shared::services::errors::game_session_service_errors::GameSessionServiceError;
use shared::services::errors::matchmaking_service_errors::MatchmakingServiceError;

/// Maps a session-service failure to the message surfaced on the requesting
/// connection. `None` means the event is dropped silently: it raced a
/// terminal transition and the session is simply no longer active, which is
/// a no-op from the client's perspective.
pub fn game_error_message(error: &GameSessionServiceError) -> Option<String> {
    match error {
        GameSessionServiceError::SessionNotActive => None,
        GameSessionServiceError::SessionNotFound
        | GameSessionServiceError::NotAParticipant
        | GameSessionServiceError::NotYourTurn
        | GameSessionServiceError::ChessError(_) => Some(error.to_string()),
    }
}

pub fn matchmaking_error_message(error: &MatchmakingServiceError) -> String {
    error.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::services::errors::chess_service_errors::ChessServiceError;

    #[test]
    fn test_non_active_session_is_silent() {
        assert!(game_error_message(&GameSessionServiceError::SessionNotActive).is_none());
    }

    #[test]
    fn test_rule_violations_surface_a_message() {
        assert!(game_error_message(&GameSessionServiceError::NotYourTurn).is_some());
        assert!(game_error_message(&GameSessionServiceError::ChessError(
            ChessServiceError::IllegalMove("Move is not legal".to_string())
        ))
        .is_some());
        assert!(game_error_message(&GameSessionServiceError::SessionNotFound).is_some());
    }
}
