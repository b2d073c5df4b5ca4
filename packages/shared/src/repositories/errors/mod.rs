pub mod archive_repository_errors;
pub mod connection_repository_errors;
pub mod queue_repository_errors;
