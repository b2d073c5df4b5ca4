use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

#[cfg(test)]
use mockall::automock;

use crate::models::game_session::GameSession;
use crate::repositories::errors::archive_repository_errors::GameArchiveError;

/// Hand-off point for finished games. The archive is the external
/// persistence collaborator: writes are best-effort and never gate the
/// in-memory terminal transition.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GameArchiveRepository: Send + Sync {
    async fn archive_game(&self, session: &GameSession) -> Result<(), GameArchiveError>;
}

#[derive(Default)]
pub struct InMemoryGameArchive {
    games: RwLock<Vec<GameSession>>,
}

impl InMemoryGameArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn archived(&self) -> Vec<GameSession> {
        self.games.read().await.clone()
    }
}

#[async_trait]
impl GameArchiveRepository for InMemoryGameArchive {
    async fn archive_game(&self, session: &GameSession) -> Result<(), GameArchiveError> {
        info!(
            "Archiving finished game {} ({} vs {})",
            session.session_id, session.white_id, session.black_id
        );
        self.games.write().await.push(session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::game_session::TimeControl;

    #[tokio::test]
    async fn test_archive_stores_record() {
        let archive = InMemoryGameArchive::new();
        let session = GameSession::new("w", "b", TimeControl::parse("10+0"));
        let session_id = session.session_id.clone();

        archive.archive_game(&session).await.unwrap();

        let stored = archive.archived().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].session_id, session_id);
    }
}
