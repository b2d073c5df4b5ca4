#[derive(Debug)]
pub enum GameArchiveError {
    Storage(String),
}

impl std::fmt::Display for GameArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameArchiveError::Storage(msg) => write!(f, "Archive storage error: {}", msg),
        }
    }
}

impl std::error::Error for GameArchiveError {}
