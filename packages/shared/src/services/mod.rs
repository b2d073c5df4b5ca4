pub mod chess_service;
pub mod errors;
pub mod game_session_service;
pub mod matchmaking_service;
pub mod websocket_service;
