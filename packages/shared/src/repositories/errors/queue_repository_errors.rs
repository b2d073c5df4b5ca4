#[derive(Debug)]
pub enum QueueRepositoryError {
    NotFound,
    ValidationError(String),
}

impl std::fmt::Display for QueueRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueRepositoryError::NotFound => write!(f, "Queue entry not found"),
            QueueRepositoryError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for QueueRepositoryError {}
