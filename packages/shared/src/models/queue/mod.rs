use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_RATING: i32 = 1200;

/// Widest rating gap the matcher will pair across.
pub const RATING_WINDOW: i32 = 200;

/// Represents a player currently waiting in a matchmaking bucket.
/// Buckets are keyed by time control (e.g. "10+0"); a player holds at most
/// one entry across the whole store at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub queue_id: String,
    pub player_id: String,
    pub rating: i32,
    pub time_control: String,
    pub joined_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn new(player_id: &str, rating: i32, time_control: &str) -> Self {
        QueueEntry {
            queue_id: Uuid::new_v4().to_string(),
            player_id: player_id.to_string(),
            rating,
            time_control: time_control.to_string(),
            joined_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_entry_creation() {
        let entry = QueueEntry::new("player-uuid", 1350, "5+0");

        assert!(!entry.queue_id.is_empty());
        assert_eq!(entry.player_id, "player-uuid");
        assert_eq!(entry.rating, 1350);
        assert_eq!(entry.time_control, "5+0");

        let now = Utc::now();
        assert!((now - entry.joined_at).num_seconds() < 10);
    }

    #[test]
    fn test_queue_entry_ids_are_unique() {
        let a = QueueEntry::new("p", DEFAULT_RATING, "10+0");
        let b = QueueEntry::new("p", DEFAULT_RATING, "10+0");
        assert_ne!(a.queue_id, b.queue_id);
    }
}
