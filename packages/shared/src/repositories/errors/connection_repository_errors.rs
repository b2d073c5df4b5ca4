#[derive(Debug)]
pub enum ConnectionRepositoryError {
    NotConnected,
    SendFailed(String),
}

impl std::fmt::Display for ConnectionRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionRepositoryError::NotConnected => write!(f, "Player is not connected"),
            ConnectionRepositoryError::SendFailed(msg) => write!(f, "Send failed: {}", msg),
        }
    }
}

impl std::error::Error for ConnectionRepositoryError {}
