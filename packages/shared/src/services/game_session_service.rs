use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info};

use crate::models::game_session::{
    GameResult, GameResultKind, GameSession, GraceInfo, MoveRecord, TimeControl,
};
use crate::models::move_request::MoveRequest;
use crate::models::queue::QueueEntry;
use crate::repositories::archive_repository::GameArchiveRepository;
use crate::repositories::game_repository::GameSessionRepository;
use crate::services::chess_service::MoveValidator;
use crate::services::errors::game_session_service_errors::GameSessionServiceError;

/// Window after a disconnect during which a fresh game is held open.
pub const DISCONNECT_GRACE_SECONDS: i64 = 30;

/// A game with this many moves is forfeited to the remaining player when the
/// other side drops; below it the disconnect policy applies its
/// grace-or-sweep split.
const MIN_MOVES_TO_FORFEIT: usize = 2;

#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub session: GameSession,
    pub record: MoveRecord,
}

#[derive(Debug, Clone)]
pub struct TerminalOutcome {
    pub session: GameSession,
    pub result: GameResult,
}

#[derive(Debug, Clone)]
pub struct ActiveSessionInfo {
    pub session: GameSession,
    pub grace: Option<GraceInfo>,
}

/// Owns every live session's lifecycle: creation from a matched pair, move
/// and resignation application, the disconnect policy, and the terminal
/// hand-off to the archive collaborator.
#[derive(Clone)]
pub struct GameSessionService {
    repository: Arc<dyn GameSessionRepository + Send + Sync>,
    validator: Arc<dyn MoveValidator + Send + Sync>,
    archive: Arc<dyn GameArchiveRepository + Send + Sync>,
}

impl GameSessionService {
    pub fn new(
        repository: Arc<dyn GameSessionRepository + Send + Sync>,
        validator: Arc<dyn MoveValidator + Send + Sync>,
        archive: Arc<dyn GameArchiveRepository + Send + Sync>,
    ) -> Self {
        GameSessionService {
            repository,
            validator,
            archive,
        }
    }

    /// Creates a session from a matched pair. Sessions start active; clocks
    /// run from this moment.
    pub async fn create_session(&self, white: &QueueEntry, black: &QueueEntry) -> GameSession {
        let time_control = TimeControl::parse(&white.time_control);
        let session = GameSession::new(&white.player_id, &black.player_id, time_control);
        info!(
            "Created game session {}: {} (white) vs {} (black), time control {}",
            session.session_id, white.player_id, black.player_id, white.time_control
        );

        let snapshot = session.clone();
        self.repository.insert(session).await;
        snapshot
    }

    pub async fn make_move(
        &self,
        session_id: &str,
        player_id: &str,
        request: &MoveRequest,
    ) -> Result<MoveOutcome, GameSessionServiceError> {
        let handle = self
            .repository
            .get(session_id)
            .await
            .ok_or(GameSessionServiceError::SessionNotFound)?;
        let mut session = handle.lock().await;

        let color = session
            .color_of(player_id)
            .ok_or(GameSessionServiceError::NotAParticipant)?;
        if !session.is_active() {
            return Err(GameSessionServiceError::SessionNotActive);
        }
        if session.whose_turn != color {
            return Err(GameSessionServiceError::NotYourTurn);
        }

        let validated = self.validator.validate_move(&session.fen_board, request)?;

        let now = Utc::now();
        let offset_ms = (now - session.created_at).num_milliseconds().max(0) as u64;
        session.deduct_clock(color, now);

        let record = MoveRecord {
            notation: validated.notation,
            from_square: validated.from_square,
            to_square: validated.to_square,
            piece: validated.piece,
            fen_after: validated.fen_after.clone(),
            capture: validated.capture,
            check: validated.check,
            checkmate: validated.checkmate,
            played_at: now,
            offset_ms,
        };

        session.fen_board = validated.fen_after;
        session.moves.push(record.clone());
        session.whose_turn = color.opposite();
        session.in_check = if validated.check || validated.checkmate {
            Some(session.whose_turn)
        } else {
            None
        };

        info!(
            "Move {} applied in session {} by {}",
            record.notation, session.session_id, player_id
        );

        if validated.checkmate || validated.stalemate || validated.draw {
            self.end_game(&mut session, None, None, None).await?;
        }

        Ok(MoveOutcome {
            session: session.clone(),
            record,
        })
    }

    pub async fn resign(
        &self,
        session_id: &str,
        player_id: &str,
    ) -> Result<TerminalOutcome, GameSessionServiceError> {
        let handle = self
            .repository
            .get(session_id)
            .await
            .ok_or(GameSessionServiceError::SessionNotFound)?;
        let mut session = handle.lock().await;

        if session.color_of(player_id).is_none() {
            return Err(GameSessionServiceError::NotAParticipant);
        }
        if !session.is_active() {
            return Err(GameSessionServiceError::SessionNotActive);
        }

        let winner = session.opponent_of(player_id).map(str::to_string);
        info!("Player {} resigned session {}", player_id, session.session_id);
        let result = self
            .end_game(
                &mut session,
                Some(GameResultKind::Resignation),
                winner,
                Some(player_id.to_string()),
            )
            .await?;

        Ok(TerminalOutcome {
            session: session.clone(),
            result,
        })
    }

    /// Applies the disconnect policy to every active session the player is
    /// bound to:
    /// - over 30s in with fewer than 2 moves: the game never got going,
    ///   sweep it as abandoned with no winner;
    /// - 2 or more moves: forfeit to the still-connected side;
    /// - otherwise: leave the session active and record the grace window.
    pub async fn handle_disconnect(&self, player_id: &str) -> Vec<TerminalOutcome> {
        let mut outcomes = Vec::new();

        for handle in self.repository.find_by_player(player_id).await {
            let mut session = handle.lock().await;
            if !session.is_active() {
                continue;
            }

            let elapsed = Utc::now() - session.created_at;
            let move_count = session.moves.len();

            if elapsed > Duration::seconds(DISCONNECT_GRACE_SECONDS)
                && move_count < MIN_MOVES_TO_FORFEIT
            {
                info!(
                    "Session {} stuck at {} moves, abandoning",
                    session.session_id, move_count
                );
                match self
                    .end_game(&mut session, Some(GameResultKind::Abandoned), None, None)
                    .await
                {
                    Ok(result) => outcomes.push(TerminalOutcome {
                        session: session.clone(),
                        result,
                    }),
                    Err(e) => error!(
                        "Failed to abandon session {}: {}",
                        session.session_id, e
                    ),
                }
            } else if move_count >= MIN_MOVES_TO_FORFEIT {
                let winner = session.opponent_of(player_id).map(str::to_string);
                info!(
                    "Player {} disconnected from session {}, forfeiting to opponent",
                    player_id, session.session_id
                );
                match self
                    .end_game(
                        &mut session,
                        Some(GameResultKind::Abandoned),
                        winner,
                        Some(player_id.to_string()),
                    )
                    .await
                {
                    Ok(result) => outcomes.push(TerminalOutcome {
                        session: session.clone(),
                        result,
                    }),
                    Err(e) => error!(
                        "Failed to forfeit session {}: {}",
                        session.session_id, e
                    ),
                }
            } else {
                let expires_at =
                    session.created_at + Duration::seconds(DISCONNECT_GRACE_SECONDS);
                session.grace = Some(GraceInfo {
                    player_id: player_id.to_string(),
                    expires_at,
                });
                info!(
                    "Holding session {} open for {} until {}",
                    session.session_id, player_id, expires_at
                );
            }
        }

        outcomes
    }

    /// Reconnect: no state transition, just a fresh snapshot for the caller
    /// and the grace window cleared if it was this player's.
    pub async fn rejoin(
        &self,
        session_id: &str,
        player_id: &str,
    ) -> Result<GameSession, GameSessionServiceError> {
        let handle = self
            .repository
            .get(session_id)
            .await
            .ok_or(GameSessionServiceError::SessionNotFound)?;
        let mut session = handle.lock().await;

        if session.color_of(player_id).is_none() {
            return Err(GameSessionServiceError::NotAParticipant);
        }

        if session
            .grace
            .as_ref()
            .is_some_and(|grace| grace.player_id == player_id)
        {
            session.grace = None;
            info!(
                "Player {} reconnected to session {}",
                player_id, session.session_id
            );
        }

        Ok(session.clone())
    }

    /// Recovery query: the active session a player is party to, if any, with
    /// the grace-period state a reconnecting client needs.
    pub async fn active_session_for(&self, player_id: &str) -> Option<ActiveSessionInfo> {
        for handle in self.repository.find_by_player(player_id).await {
            let session = handle.lock().await;
            if session.is_active() {
                return Some(ActiveSessionInfo {
                    grace: session.grace.clone(),
                    session: session.clone(),
                });
            }
        }
        None
    }

    /// The single terminal transition entry point. An explicit kind passes
    /// through; `None` derives the result from the current position
    /// (checkmate charged to the side to move, else stalemate, else draw).
    /// The session leaves the registry here and the finished record goes to
    /// the archive; an archive failure is logged and does not roll the
    /// termination back.
    async fn end_game(
        &self,
        session: &mut GameSession,
        kind: Option<GameResultKind>,
        winner: Option<String>,
        loser: Option<String>,
    ) -> Result<GameResult, GameSessionServiceError> {
        let (kind, winner, loser) = match kind {
            Some(kind) => (kind, winner, loser),
            None => {
                let assessment = self.validator.assess_position(&session.fen_board)?;
                if assessment.checkmate {
                    let loser_id = session.player_id(assessment.side_to_move).to_string();
                    let winner_id = session
                        .player_id(assessment.side_to_move.opposite())
                        .to_string();
                    (GameResultKind::Checkmate, Some(winner_id), Some(loser_id))
                } else if assessment.stalemate {
                    (GameResultKind::Stalemate, None, None)
                } else {
                    (GameResultKind::Draw, None, None)
                }
            }
        };

        session.terminate(kind, winner.clone(), loser.clone());
        self.repository.remove(&session.session_id).await;

        if let Err(e) = self.archive.archive_game(session).await {
            error!(
                "Failed to archive finished game {}: {}",
                session.session_id, e
            );
        }

        info!(
            "Session {} ended: {:?}, winner {:?}",
            session.session_id, kind, winner
        );

        Ok(GameResult {
            kind,
            winner,
            loser,
        })
    }
}
