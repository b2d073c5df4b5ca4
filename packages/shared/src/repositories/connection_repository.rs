use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use tracing::info;

use crate::repositories::errors::connection_repository_errors::ConnectionRepositoryError;

pub type OutboundSender = UnboundedSender<String>;

/// One live WebSocket binding: an authenticated identity, the uuid of the
/// socket currently carrying it, and the outbound channel into that socket's
/// writer task.
#[derive(Debug, Clone)]
pub struct Connection {
    pub connection_id: String,
    pub player_id: String,
    pub sender: OutboundSender,
    pub connected_at: DateTime<Utc>,
}

#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    async fn store_connection(&self, connection: Connection);

    /// Unbinds by socket id; returns the player id only if that socket was
    /// still the player's current binding. A reconnect replaces the binding,
    /// after which the old socket's close resolves to `None`.
    async fn remove_connection_by_id(&self, connection_id: &str) -> Option<String>;

    async fn get_connection(&self, player_id: &str) -> Option<Connection>;

    async fn send_message(
        &self,
        player_id: &str,
        message: &str,
    ) -> Result<(), ConnectionRepositoryError>;

    async fn broadcast(&self, message: &str);
}

#[derive(Default)]
pub struct InMemoryConnectionRepository {
    connections: RwLock<HashMap<String, Connection>>,
}

impl InMemoryConnectionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn store_connection(&self, connection: Connection) {
        info!(
            "Storing connection {} for player {}",
            connection.connection_id, connection.player_id
        );
        let mut connections = self.connections.write().await;
        connections.insert(connection.player_id.clone(), connection);
    }

    async fn remove_connection_by_id(&self, connection_id: &str) -> Option<String> {
        let mut connections = self.connections.write().await;
        let player_id = connections
            .values()
            .find(|c| c.connection_id == connection_id)
            .map(|c| c.player_id.clone())?;

        connections.remove(&player_id);
        info!(
            "Removed connection {} for player {}",
            connection_id, player_id
        );
        Some(player_id)
    }

    async fn get_connection(&self, player_id: &str) -> Option<Connection> {
        let connections = self.connections.read().await;
        connections.get(player_id).cloned()
    }

    async fn send_message(
        &self,
        player_id: &str,
        message: &str,
    ) -> Result<(), ConnectionRepositoryError> {
        let connections = self.connections.read().await;
        let connection = connections
            .get(player_id)
            .ok_or(ConnectionRepositoryError::NotConnected)?;

        connection
            .sender
            .send(message.to_string())
            .map_err(|e| ConnectionRepositoryError::SendFailed(e.to_string()))
    }

    async fn broadcast(&self, message: &str) {
        let connections = self.connections.read().await;
        for connection in connections.values() {
            // A closed channel here just means the socket task is winding
            // down; its disconnect path cleans the entry up.
            let _ = connection.sender.send(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn connection(player_id: &str, connection_id: &str) -> (Connection, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Connection {
                connection_id: connection_id.to_string(),
                player_id: player_id.to_string(),
                sender: tx,
                connected_at: Utc::now(),
            },
            rx,
        )
    }

    #[tokio::test]
    async fn test_store_and_send() {
        let repo = InMemoryConnectionRepository::new();
        let (conn, mut rx) = connection("p1", "c1");
        repo.store_connection(conn).await;

        repo.send_message("p1", "hello").await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_send_to_unknown_player_fails() {
        let repo = InMemoryConnectionRepository::new();
        let result = repo.send_message("ghost", "hello").await;
        assert!(matches!(
            result,
            Err(ConnectionRepositoryError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_rebind_replaces_connection() {
        let repo = InMemoryConnectionRepository::new();
        let (old, mut old_rx) = connection("p1", "c1");
        let (new, mut new_rx) = connection("p1", "c2");
        repo.store_connection(old).await;
        repo.store_connection(new).await;

        repo.send_message("p1", "after-rebind").await.unwrap();

        assert_eq!(new_rx.recv().await.unwrap(), "after-rebind");
        assert!(old_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stale_socket_close_does_not_unbind_rebound_player() {
        let repo = InMemoryConnectionRepository::new();
        let (old, _old_rx) = connection("p1", "c1");
        let (new, _new_rx) = connection("p1", "c2");
        repo.store_connection(old).await;
        repo.store_connection(new).await;

        assert_eq!(repo.remove_connection_by_id("c1").await, None);
        assert!(repo.get_connection("p1").await.is_some());

        assert_eq!(
            repo.remove_connection_by_id("c2").await,
            Some("p1".to_string())
        );
        assert!(repo.get_connection("p1").await.is_none());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_connections() {
        let repo = InMemoryConnectionRepository::new();
        let (a, mut a_rx) = connection("p1", "c1");
        let (b, mut b_rx) = connection("p2", "c2");
        repo.store_connection(a).await;
        repo.store_connection(b).await;

        repo.broadcast("fanout").await;

        assert_eq!(a_rx.recv().await.unwrap(), "fanout");
        assert_eq!(b_rx.recv().await.unwrap(), "fanout");
    }
}
