use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::models::queue::{QueueEntry, RATING_WINDOW};
use crate::repositories::errors::queue_repository_errors::QueueRepositoryError;

/// The queue store: one ordered bucket of waiting players per time control.
///
/// Mutating operations return the keys of every bucket whose size changed so
/// the caller can broadcast updated sizes.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QueueRepository: Send + Sync {
    async fn enqueue(&self, entry: QueueEntry) -> Result<Vec<String>, QueueRepositoryError>;

    async fn find_match(
        &self,
        player_id: &str,
        time_control: &str,
        rating: i32,
    ) -> Result<Option<QueueEntry>, QueueRepositoryError>;

    async fn remove_matched(
        &self,
        player_a: &str,
        player_b: &str,
        time_control: &str,
    ) -> Result<(), QueueRepositoryError>;

    async fn leave(&self, player_id: &str) -> Result<Vec<String>, QueueRepositoryError>;

    async fn cleanup(&self, max_wait: Duration) -> Result<Vec<String>, QueueRepositoryError>;

    async fn queue_size(&self, time_control: &str) -> usize;
}

#[derive(Default)]
pub struct InMemoryQueueRepository {
    buckets: RwLock<HashMap<String, Vec<QueueEntry>>>,
}

impl InMemoryQueueRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn remove_player(
    buckets: &mut HashMap<String, Vec<QueueEntry>>,
    player_id: &str,
    affected: &mut Vec<String>,
) {
    for (key, bucket) in buckets.iter_mut() {
        let before = bucket.len();
        bucket.retain(|entry| entry.player_id != player_id);
        if bucket.len() != before {
            affected.push(key.clone());
        }
    }
    buckets.retain(|_, bucket| !bucket.is_empty());
}

#[async_trait]
impl QueueRepository for InMemoryQueueRepository {
    /// Appends the entry to its bucket, first removing any prior entry for
    /// the same player from every bucket (a re-join silently migrates).
    async fn enqueue(&self, entry: QueueEntry) -> Result<Vec<String>, QueueRepositoryError> {
        let mut buckets = self.buckets.write().await;
        let mut affected = Vec::new();

        remove_player(&mut buckets, &entry.player_id, &mut affected);

        let key = entry.time_control.clone();
        buckets.entry(key.clone()).or_default().push(entry);
        if !affected.contains(&key) {
            affected.push(key);
        }

        Ok(affected)
    }

    /// First-fit scan in queue order: the first entry with a different
    /// identity and a rating within the window wins. No secondary sort.
    async fn find_match(
        &self,
        player_id: &str,
        time_control: &str,
        rating: i32,
    ) -> Result<Option<QueueEntry>, QueueRepositoryError> {
        let buckets = self.buckets.read().await;
        let Some(bucket) = buckets.get(time_control) else {
            return Ok(None);
        };

        let found = bucket
            .iter()
            .find(|entry| {
                entry.player_id != player_id && (entry.rating - rating).abs() <= RATING_WINDOW
            })
            .cloned();

        Ok(found)
    }

    /// All-or-nothing removal under one lock acquisition: if either entry is
    /// gone the bucket is left untouched and `NotFound` is returned, so a
    /// concurrent scan never observes a half-removed pair.
    async fn remove_matched(
        &self,
        player_a: &str,
        player_b: &str,
        time_control: &str,
    ) -> Result<(), QueueRepositoryError> {
        let mut buckets = self.buckets.write().await;
        let bucket = buckets
            .get_mut(time_control)
            .ok_or(QueueRepositoryError::NotFound)?;

        let has_a = bucket.iter().any(|entry| entry.player_id == player_a);
        let has_b = bucket.iter().any(|entry| entry.player_id == player_b);
        if !has_a || !has_b {
            return Err(QueueRepositoryError::NotFound);
        }

        bucket.retain(|entry| entry.player_id != player_a && entry.player_id != player_b);
        if bucket.is_empty() {
            buckets.remove(time_control);
        }

        Ok(())
    }

    async fn leave(&self, player_id: &str) -> Result<Vec<String>, QueueRepositoryError> {
        let mut buckets = self.buckets.write().await;
        let mut affected = Vec::new();
        remove_player(&mut buckets, player_id, &mut affected);
        Ok(affected)
    }

    /// Drops entries older than `max_wait` across all buckets.
    async fn cleanup(&self, max_wait: Duration) -> Result<Vec<String>, QueueRepositoryError> {
        let cutoff = Utc::now() - max_wait;
        let mut buckets = self.buckets.write().await;
        let mut affected = Vec::new();

        for (key, bucket) in buckets.iter_mut() {
            let before = bucket.len();
            bucket.retain(|entry| entry.joined_at > cutoff);
            if bucket.len() != before {
                debug!(
                    "Removed {} stale entries from queue {}",
                    before - bucket.len(),
                    key
                );
                affected.push(key.clone());
            }
        }
        buckets.retain(|_, bucket| !bucket.is_empty());

        Ok(affected)
    }

    async fn queue_size(&self, time_control: &str) -> usize {
        let buckets = self.buckets.read().await;
        buckets.get(time_control).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(player_id: &str, rating: i32, time_control: &str) -> QueueEntry {
        QueueEntry::new(player_id, rating, time_control)
    }

    #[tokio::test]
    async fn test_enqueue_and_size() {
        let repo = InMemoryQueueRepository::new();

        let affected = repo.enqueue(entry("p1", 1200, "10+0")).await.unwrap();

        assert_eq!(affected, vec!["10+0".to_string()]);
        assert_eq!(repo.queue_size("10+0").await, 1);
        assert_eq!(repo.queue_size("5+0").await, 0);
    }

    #[tokio::test]
    async fn test_enqueue_migrates_between_buckets() {
        let repo = InMemoryQueueRepository::new();
        repo.enqueue(entry("p1", 1200, "10+0")).await.unwrap();

        let affected = repo.enqueue(entry("p1", 1200, "5+0")).await.unwrap();

        assert_eq!(repo.queue_size("10+0").await, 0);
        assert_eq!(repo.queue_size("5+0").await, 1);
        assert!(affected.contains(&"10+0".to_string()));
        assert!(affected.contains(&"5+0".to_string()));
    }

    #[tokio::test]
    async fn test_rejoining_same_bucket_does_not_duplicate() {
        let repo = InMemoryQueueRepository::new();
        repo.enqueue(entry("p1", 1200, "10+0")).await.unwrap();
        repo.enqueue(entry("p1", 1300, "10+0")).await.unwrap();

        assert_eq!(repo.queue_size("10+0").await, 1);
    }

    #[tokio::test]
    async fn test_find_match_first_fit_in_queue_order() {
        let repo = InMemoryQueueRepository::new();
        repo.enqueue(entry("p1", 1250, "10+0")).await.unwrap();
        repo.enqueue(entry("p2", 1210, "10+0")).await.unwrap();

        // p2 is a closer rating fit but p1 joined first.
        let found = repo.find_match("p3", "10+0", 1200).await.unwrap().unwrap();
        assert_eq!(found.player_id, "p1");
    }

    #[tokio::test]
    async fn test_find_match_respects_rating_window() {
        let repo = InMemoryQueueRepository::new();
        repo.enqueue(entry("p1", 1500, "10+0")).await.unwrap();

        assert!(repo.find_match("p2", "10+0", 1200).await.unwrap().is_none());
        assert!(repo.find_match("p2", "10+0", 1300).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_match_skips_self() {
        let repo = InMemoryQueueRepository::new();
        repo.enqueue(entry("p1", 1200, "10+0")).await.unwrap();

        assert!(repo.find_match("p1", "10+0", 1200).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_matched_removes_both() {
        let repo = InMemoryQueueRepository::new();
        repo.enqueue(entry("p1", 1200, "10+0")).await.unwrap();
        repo.enqueue(entry("p2", 1250, "10+0")).await.unwrap();

        repo.remove_matched("p1", "p2", "10+0").await.unwrap();

        assert_eq!(repo.queue_size("10+0").await, 0);
    }

    #[tokio::test]
    async fn test_remove_matched_is_all_or_nothing() {
        let repo = InMemoryQueueRepository::new();
        repo.enqueue(entry("p1", 1200, "10+0")).await.unwrap();

        let result = repo.remove_matched("p1", "gone", "10+0").await;

        assert!(matches!(result, Err(QueueRepositoryError::NotFound)));
        assert_eq!(repo.queue_size("10+0").await, 1);
    }

    #[tokio::test]
    async fn test_leave_removes_across_buckets() {
        let repo = InMemoryQueueRepository::new();
        repo.enqueue(entry("p1", 1200, "10+0")).await.unwrap();
        repo.enqueue(entry("p2", 1200, "10+0")).await.unwrap();

        let affected = repo.leave("p1").await.unwrap();

        assert_eq!(affected, vec!["10+0".to_string()]);
        assert_eq!(repo.queue_size("10+0").await, 1);

        let affected = repo.leave("unknown").await.unwrap();
        assert!(affected.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_drops_only_stale_entries() {
        let repo = InMemoryQueueRepository::new();
        let mut stale = entry("old", 1200, "10+0");
        stale.joined_at = Utc::now() - Duration::minutes(6);
        repo.enqueue(stale).await.unwrap();
        repo.enqueue(entry("fresh", 1200, "10+0")).await.unwrap();

        let affected = repo.cleanup(Duration::minutes(5)).await.unwrap();

        assert_eq!(affected, vec!["10+0".to_string()]);
        assert_eq!(repo.queue_size("10+0").await, 1);
        let remaining = repo.find_match("x", "10+0", 1200).await.unwrap().unwrap();
        assert_eq!(remaining.player_id, "fresh");
    }

    proptest! {
        /// After any sequence of joins, a player sits in at most one bucket.
        #[test]
        fn prop_player_appears_in_at_most_one_bucket(
            joins in proptest::collection::vec((0usize..4, 0usize..3), 1..40)
        ) {
            let players = ["a", "b", "c", "d"];
            let controls = ["10+0", "5+0", "3+2"];

            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            runtime.block_on(async {
                let repo = InMemoryQueueRepository::new();
                for (player_index, control_index) in joins {
                    repo.enqueue(entry(players[player_index], 1200, controls[control_index]))
                        .await
                        .unwrap();
                }

                let buckets = repo.buckets.read().await;
                for player in players {
                    let occurrences: usize = buckets
                        .values()
                        .flat_map(|bucket| bucket.iter())
                        .filter(|e| e.player_id == player)
                        .count();
                    prop_assert!(occurrences <= 1, "{} queued {} times", player, occurrences);
                }
                Ok(())
            })?;
        }
    }
}
