use crate::repositories::errors::queue_repository_errors::QueueRepositoryError;

#[derive(Debug)]
pub enum MatchmakingServiceError {
    ValidationError(String),
    RepositoryError(QueueRepositoryError),
}

impl std::fmt::Display for MatchmakingServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchmakingServiceError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
            MatchmakingServiceError::RepositoryError(err) => {
                write!(f, "Repository error: {}", err)
            }
        }
    }
}

impl std::error::Error for MatchmakingServiceError {}

impl From<QueueRepositoryError> for MatchmakingServiceError {
    fn from(err: QueueRepositoryError) -> Self {
        MatchmakingServiceError::RepositoryError(err)
    }
}
