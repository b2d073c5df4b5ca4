use std::sync::Arc;

use shared::repositories::archive_repository::InMemoryGameArchive;
use shared::repositories::connection_repository::InMemoryConnectionRepository;
use shared::repositories::game_repository::InMemoryGameSessionRepository;
use shared::repositories::queue_repository::InMemoryQueueRepository;
use shared::services::chess_service::ChessService;
use shared::services::game_session_service::GameSessionService;
use shared::services::matchmaking_service::MatchmakingService;
use shared::services::websocket_service::WebSocketService;

#[derive(Clone)]
pub struct AppState {
    pub websocket_service: Arc<WebSocketService>,
    pub matchmaking_service: Arc<MatchmakingService>,
    pub game_session_service: Arc<GameSessionService>,
}

impl AppState {
    /// Wires the full in-memory stack: owned stores constructed here, torn
    /// down when the process exits. Tests build isolated instances the same
    /// way.
    pub fn new_in_memory() -> Self {
        let connection_repository = Arc::new(InMemoryConnectionRepository::new());
        let queue_repository = Arc::new(InMemoryQueueRepository::new());
        let game_repository = Arc::new(InMemoryGameSessionRepository::new());
        let archive = Arc::new(InMemoryGameArchive::new());

        let websocket_service = Arc::new(WebSocketService::new(connection_repository));
        let matchmaking_service = Arc::new(MatchmakingService::new(queue_repository));
        let game_session_service = Arc::new(GameSessionService::new(
            game_repository,
            Arc::new(ChessService::new()),
            archive,
        ));

        AppState {
            websocket_service,
            matchmaking_service,
            game_session_service,
        }
    }
}
