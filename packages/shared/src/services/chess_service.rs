use chess::{Board, BoardStatus, ChessMove, MoveGen, Piece, Square};
use std::str::FromStr;

use crate::models::game_session::Color;
use crate::models::move_request::MoveRequest;
use crate::services::errors::chess_service_errors::ChessServiceError;

/// Outcome of validating a proposed move against a position.
#[derive(Debug, Clone)]
pub struct ValidatedMove {
    pub fen_after: String,
    pub notation: String,
    pub from_square: String,
    pub to_square: String,
    pub piece: String,
    pub capture: bool,
    pub check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    pub draw: bool,
}

/// Terminal-state reading of a standalone position.
#[derive(Debug, Clone)]
pub struct PositionAssessment {
    pub side_to_move: Color,
    pub in_check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    pub draw: bool,
}

/// The rules engine boundary. Session machinery consumes moves through this
/// trait only; the engine behind it is interchangeable.
pub trait MoveValidator: Send + Sync {
    fn validate_move(
        &self,
        fen: &str,
        request: &MoveRequest,
    ) -> Result<ValidatedMove, ChessServiceError>;

    fn assess_position(&self, fen: &str) -> Result<PositionAssessment, ChessServiceError>;
}

#[derive(Clone, Default)]
pub struct ChessService;

impl ChessService {
    pub fn new() -> Self {
        ChessService
    }
}

fn piece_name(piece: Piece) -> &'static str {
    match piece {
        Piece::Pawn => "pawn",
        Piece::Knight => "knight",
        Piece::Bishop => "bishop",
        Piece::Rook => "rook",
        Piece::Queen => "queen",
        Piece::King => "king",
    }
}

fn model_color(color: chess::Color) -> Color {
    match color {
        chess::Color::White => Color::White,
        chess::Color::Black => Color::Black,
    }
}

impl MoveValidator for ChessService {
    fn validate_move(
        &self,
        fen: &str,
        request: &MoveRequest,
    ) -> Result<ValidatedMove, ChessServiceError> {
        let board = Board::from_str(fen)
            .map_err(|e| ChessServiceError::InvalidPosition(format!("Invalid FEN: {}", e)))?;

        if board.status() != BoardStatus::Ongoing {
            return Err(ChessServiceError::GameOver(
                "Game is already over".to_string(),
            ));
        }

        let from_sq = Square::from_str(&request.from_square)
            .map_err(|_| ChessServiceError::ValidationError("Invalid from square".to_string()))?;
        let to_sq = Square::from_str(&request.to_square)
            .map_err(|_| ChessServiceError::ValidationError("Invalid to square".to_string()))?;

        let promotion = match &request.promotion_piece {
            Some(p) => match p.as_str() {
                "q" => Some(Piece::Queen),
                "r" => Some(Piece::Rook),
                "b" => Some(Piece::Bishop),
                "n" => Some(Piece::Knight),
                _ => {
                    return Err(ChessServiceError::ValidationError(
                        "Invalid promotion piece".to_string(),
                    ))
                }
            },
            None => None,
        };

        let chess_move = ChessMove::new(from_sq, to_sq, promotion);

        let legal_moves: Vec<ChessMove> = MoveGen::new_legal(&board).collect();
        if !legal_moves.contains(&chess_move) {
            return Err(ChessServiceError::IllegalMove(
                "Move is not legal".to_string(),
            ));
        }

        let moved_piece = board.piece_on(from_sq).ok_or_else(|| {
            ChessServiceError::IllegalMove("No piece on from square".to_string())
        })?;
        // Diagonal pawn moves to an empty square are en passant captures.
        let capture = board.piece_on(to_sq).is_some()
            || (moved_piece == Piece::Pawn && from_sq.get_file() != to_sq.get_file());

        let mut new_board = board;
        board.make_move(chess_move, &mut new_board);

        let status = new_board.status();
        let notation = format!(
            "{}{}{}",
            request.from_square,
            request.to_square,
            request.promotion_piece.as_deref().unwrap_or("")
        );

        Ok(ValidatedMove {
            fen_after: format!("{}", new_board),
            notation,
            from_square: request.from_square.clone(),
            to_square: request.to_square.clone(),
            piece: piece_name(moved_piece).to_string(),
            capture,
            check: new_board.checkers().popcnt() > 0 && status == BoardStatus::Ongoing,
            checkmate: status == BoardStatus::Checkmate,
            stalemate: status == BoardStatus::Stalemate,
            draw: new_board.combined().popcnt() == 2,
        })
    }

    fn assess_position(&self, fen: &str) -> Result<PositionAssessment, ChessServiceError> {
        let board = Board::from_str(fen)
            .map_err(|e| ChessServiceError::InvalidPosition(format!("Invalid FEN: {}", e)))?;

        let status = board.status();
        Ok(PositionAssessment {
            side_to_move: model_color(board.side_to_move()),
            in_check: board.checkers().popcnt() > 0,
            checkmate: status == BoardStatus::Checkmate,
            stalemate: status == BoardStatus::Stalemate,
            draw: board.combined().popcnt() == 2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::game_session::STARTING_FEN;

    #[test]
    fn test_validate_move_valid_move() {
        let service = ChessService::new();
        let request = MoveRequest::new("e2", "e4");

        let validated = service.validate_move(STARTING_FEN, &request).unwrap();

        assert_ne!(validated.fen_after, STARTING_FEN);
        assert_eq!(validated.notation, "e2e4");
        assert_eq!(validated.piece, "pawn");
        assert!(!validated.capture);
        assert!(!validated.check);
        assert!(!validated.checkmate);
        assert!(!validated.stalemate);
    }

    #[test]
    fn test_validate_move_illegal_move() {
        let service = ChessService::new();
        let request = MoveRequest::new("e2", "e5");

        let result = service.validate_move(STARTING_FEN, &request);

        match result.unwrap_err() {
            ChessServiceError::IllegalMove(_) => {}
            other => panic!("Expected IllegalMove error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_move_invalid_square() {
        let service = ChessService::new();
        let request = MoveRequest::new("z9", "e4");

        let result = service.validate_move(STARTING_FEN, &request);

        match result.unwrap_err() {
            ChessServiceError::ValidationError(msg) => assert_eq!(msg, "Invalid from square"),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_move_with_promotion() {
        let service = ChessService::new();
        let fen = "8/P7/8/8/8/8/8/K6k w - - 0 1";
        let request = MoveRequest::with_promotion("a7", "a8", "q");

        let validated = service.validate_move(fen, &request).unwrap();

        assert!(validated.fen_after.contains('Q'));
        assert_eq!(validated.notation, "a7a8q");
        assert!(validated.check);
        assert!(!validated.checkmate);
    }

    #[test]
    fn test_validate_move_rejects_bad_promotion_piece() {
        let service = ChessService::new();
        let request = MoveRequest::with_promotion("a7", "a8", "k");

        let result = service.validate_move("8/P7/8/8/8/8/8/K6k w - - 0 1", &request);

        assert!(matches!(
            result,
            Err(ChessServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn test_fools_mate_reports_checkmate() {
        let service = ChessService::new();
        let mut fen = STARTING_FEN.to_string();

        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4")] {
            let validated = service
                .validate_move(&fen, &MoveRequest::new(from, to))
                .unwrap();
            fen = validated.fen_after;
        }

        let mate = service
            .validate_move(&fen, &MoveRequest::new("d8", "h4"))
            .unwrap();

        assert!(mate.checkmate);
        assert!(!mate.stalemate);
        assert_eq!(mate.piece, "queen");
    }

    #[test]
    fn test_validate_move_rejects_finished_game() {
        let service = ChessService::new();
        // Fool's mate final position, white to move with no legal reply.
        let fen = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";

        let result = service.validate_move(fen, &MoveRequest::new("a2", "a3"));

        assert!(matches!(result, Err(ChessServiceError::GameOver(_))));
    }

    #[test]
    fn test_assess_position_checkmate() {
        let service = ChessService::new();
        let fen = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";

        let assessment = service.assess_position(fen).unwrap();

        assert!(assessment.checkmate);
        assert!(assessment.in_check);
        assert_eq!(assessment.side_to_move, Color::White);
    }

    #[test]
    fn test_assess_position_stalemate() {
        let service = ChessService::new();
        let fen = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";

        let assessment = service.assess_position(fen).unwrap();

        assert!(assessment.stalemate);
        assert!(!assessment.checkmate);
        assert!(!assessment.in_check);
    }

    #[test]
    fn test_assess_position_ongoing() {
        let service = ChessService::new();

        let assessment = service.assess_position(STARTING_FEN).unwrap();

        assert!(!assessment.checkmate);
        assert!(!assessment.stalemate);
        assert!(!assessment.draw);
        assert_eq!(assessment.side_to_move, Color::White);
    }

    #[test]
    fn test_legal_move_count_from_start() {
        let board = Board::from_str(STARTING_FEN).unwrap();
        assert_eq!(MoveGen::new_legal(&board).count(), 20);
    }
}
