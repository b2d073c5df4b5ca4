pub mod events;
pub mod game_session;
pub mod move_request;
pub mod queue;
