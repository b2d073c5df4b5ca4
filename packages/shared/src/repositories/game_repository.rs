use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::models::game_session::GameSession;

/// A live session handle. The mutex serializes every read-then-write on a
/// session, so same-session events apply in lock acquisition order while
/// distinct sessions never contend.
pub type SharedGameSession = Arc<Mutex<GameSession>>;

/// The session registry: owns all live sessions, keyed by session id, with
/// a player index for the disconnect sweep and the recovery query. Sessions
/// enter on creation and leave on their terminal transition; the registry
/// itself is infallible in-memory state.
#[async_trait]
pub trait GameSessionRepository: Send + Sync {
    async fn insert(&self, session: GameSession) -> SharedGameSession;
    async fn get(&self, session_id: &str) -> Option<SharedGameSession>;
    async fn remove(&self, session_id: &str);
    async fn find_by_player(&self, player_id: &str) -> Vec<SharedGameSession>;
}

struct RegisteredSession {
    white_id: String,
    black_id: String,
    session: SharedGameSession,
}

#[derive(Default)]
pub struct InMemoryGameSessionRepository {
    sessions: RwLock<HashMap<String, RegisteredSession>>,
}

impl InMemoryGameSessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameSessionRepository for InMemoryGameSessionRepository {
    async fn insert(&self, session: GameSession) -> SharedGameSession {
        let session_id = session.session_id.clone();
        let registered = RegisteredSession {
            white_id: session.white_id.clone(),
            black_id: session.black_id.clone(),
            session: Arc::new(Mutex::new(session)),
        };
        let handle = registered.session.clone();
        self.sessions.write().await.insert(session_id, registered);
        handle
    }

    async fn get(&self, session_id: &str) -> Option<SharedGameSession> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(|r| r.session.clone())
    }

    async fn remove(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
    }

    async fn find_by_player(&self, player_id: &str) -> Vec<SharedGameSession> {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .filter(|r| r.white_id == player_id || r.black_id == player_id)
            .map(|r| r.session.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::game_session::TimeControl;

    fn session(white: &str, black: &str) -> GameSession {
        GameSession::new(white, black, TimeControl::parse("10+0"))
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = InMemoryGameSessionRepository::new();
        let created = session("w", "b");
        let session_id = created.session_id.clone();

        repo.insert(created).await;

        let handle = repo.get(&session_id).await.unwrap();
        let guard = handle.lock().await;
        assert_eq!(guard.session_id, session_id);
        assert_eq!(guard.white_id, "w");
    }

    #[tokio::test]
    async fn test_get_unknown_returns_none() {
        let repo = InMemoryGameSessionRepository::new();
        assert!(repo.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_drops_session() {
        let repo = InMemoryGameSessionRepository::new();
        let created = session("w", "b");
        let session_id = created.session_id.clone();
        repo.insert(created).await;

        repo.remove(&session_id).await;

        assert!(repo.get(&session_id).await.is_none());
        assert!(repo.find_by_player("w").await.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_player_matches_either_side() {
        let repo = InMemoryGameSessionRepository::new();
        repo.insert(session("w1", "b1")).await;
        repo.insert(session("w2", "b2")).await;

        assert_eq!(repo.find_by_player("w1").await.len(), 1);
        assert_eq!(repo.find_by_player("b2").await.len(), 1);
        assert!(repo.find_by_player("stranger").await.is_empty());
    }

    #[tokio::test]
    async fn test_mutation_through_handle_is_visible() {
        let repo = InMemoryGameSessionRepository::new();
        let created = session("w", "b");
        let session_id = created.session_id.clone();
        let handle = repo.insert(created).await;

        handle.lock().await.time_remaining_white_ms = 1234;

        let again = repo.get(&session_id).await.unwrap();
        assert_eq!(again.lock().await.time_remaining_white_ms, 1234);
    }
}
