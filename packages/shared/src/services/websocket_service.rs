use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::models::events::ServerEvent;
use crate::repositories::connection_repository::{
    Connection, ConnectionRepository, OutboundSender,
};

/// Outbound delivery over the connection registry. Serialization happens
/// once here; delivery to an offline player is skipped, not an error.
#[derive(Clone)]
pub struct WebSocketService {
    repository: Arc<dyn ConnectionRepository>,
}

impl WebSocketService {
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }

    /// Binds a connection to an identity. Idempotent: re-authenticating (or
    /// reconnecting on a fresh socket) replaces the binding in place, which
    /// retargets every later outbound event at the new socket.
    pub async fn bind(&self, player_id: &str, connection_id: &str, sender: OutboundSender) {
        self.repository
            .store_connection(Connection {
                connection_id: connection_id.to_string(),
                player_id: player_id.to_string(),
                sender,
                connected_at: Utc::now(),
            })
            .await;
    }

    /// Returns the identity that was bound to this socket, if it still was.
    pub async fn unbind_by_connection(&self, connection_id: &str) -> Option<String> {
        self.repository.remove_connection_by_id(connection_id).await
    }

    pub async fn is_connected(&self, player_id: &str) -> bool {
        self.repository.get_connection(player_id).await.is_some()
    }

    pub async fn send_event(&self, player_id: &str, event: &ServerEvent) {
        let message = match serde_json::to_string(event) {
            Ok(message) => message,
            Err(e) => {
                error!("Failed to serialize outbound event: {}", e);
                return;
            }
        };

        if let Err(e) = self.repository.send_message(player_id, &message).await {
            info!(
                "Player {} is not reachable, skipping event: {}",
                player_id, e
            );
        }
    }

    pub async fn broadcast_event(&self, event: &ServerEvent) {
        match serde_json::to_string(event) {
            Ok(message) => {
                debug!("Broadcasting event to all connections");
                self.repository.broadcast(&message).await;
            }
            Err(e) => error!("Failed to serialize broadcast event: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::connection_repository::InMemoryConnectionRepository;
    use tokio::sync::mpsc;

    fn service() -> WebSocketService {
        WebSocketService::new(Arc::new(InMemoryConnectionRepository::new()))
    }

    #[tokio::test]
    async fn test_bind_and_send_event() {
        let service = service();
        let (tx, mut rx) = mpsc::unbounded_channel();
        service.bind("p1", "c1", tx).await;

        service.send_event("p1", &ServerEvent::Pong).await;

        let message = rx.recv().await.unwrap();
        assert!(message.contains(r#""action":"pong""#));
    }

    #[tokio::test]
    async fn test_send_to_offline_player_is_skipped() {
        let service = service();
        // No panic, no error surfaced.
        service.send_event("offline", &ServerEvent::Pong).await;
    }

    #[tokio::test]
    async fn test_unbind_returns_identity_only_for_current_socket() {
        let service = service();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        service.bind("p1", "c1", tx1).await;
        service.bind("p1", "c2", tx2).await;

        assert_eq!(service.unbind_by_connection("c1").await, None);
        assert!(service.is_connected("p1").await);
        assert_eq!(
            service.unbind_by_connection("c2").await,
            Some("p1".to_string())
        );
        assert!(!service.is_connected("p1").await);
    }
}
