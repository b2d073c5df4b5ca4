pub mod archive_repository;
pub mod connection_repository;
pub mod errors;
pub mod game_repository;
pub mod queue_repository;
