use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};

use crate::models::queue::{QueueEntry, DEFAULT_RATING};
use crate::repositories::errors::queue_repository_errors::QueueRepositoryError;
use crate::repositories::queue_repository::QueueRepository;
use crate::services::errors::matchmaking_service_errors::MatchmakingServiceError;

/// Entries older than this are swept from the queues.
pub const MAX_QUEUE_WAIT_MINUTES: i64 = 5;

/// A matched pair ready for session creation. The earlier entrant takes
/// white.
#[derive(Debug, Clone)]
pub struct MatchedPair {
    pub white: QueueEntry,
    pub black: QueueEntry,
}

#[derive(Debug, Clone)]
pub struct JoinQueueOutcome {
    pub entry: QueueEntry,
    /// Buckets whose size changed and need a `queue_update` broadcast.
    pub affected_buckets: Vec<String>,
    pub matched: Option<MatchedPair>,
}

/// The pairing engine. Matching happens synchronously inside `join_queue`:
/// there is no background matcher sweep, so an unmatched entry waits until
/// some later join scans the bucket it sits in.
#[derive(Clone)]
pub struct MatchmakingService {
    repository: Arc<dyn QueueRepository + Send + Sync>,
}

impl MatchmakingService {
    pub fn new(repository: Arc<dyn QueueRepository + Send + Sync>) -> Self {
        MatchmakingService { repository }
    }

    pub async fn join_queue(
        &self,
        player_id: &str,
        time_control: &str,
        rating: Option<i32>,
    ) -> Result<JoinQueueOutcome, MatchmakingServiceError> {
        if time_control.is_empty() {
            return Err(MatchmakingServiceError::ValidationError(
                "Time control cannot be empty".to_string(),
            ));
        }

        let rating = rating.unwrap_or(DEFAULT_RATING);
        let entry = QueueEntry::new(player_id, rating, time_control);
        let affected_buckets = self.repository.enqueue(entry.clone()).await?;
        info!(
            "Player {} joined queue {} with rating {}",
            player_id, time_control, rating
        );

        let matched = self.try_match(&entry).await?;

        Ok(JoinQueueOutcome {
            entry,
            affected_buckets,
            matched,
        })
    }

    async fn try_match(
        &self,
        entry: &QueueEntry,
    ) -> Result<Option<MatchedPair>, MatchmakingServiceError> {
        let Some(opponent) = self
            .repository
            .find_match(&entry.player_id, &entry.time_control, entry.rating)
            .await?
        else {
            return Ok(None);
        };

        match self
            .repository
            .remove_matched(&entry.player_id, &opponent.player_id, &entry.time_control)
            .await
        {
            Ok(()) => {
                info!(
                    "Matched {} with {} in queue {}",
                    entry.player_id, opponent.player_id, entry.time_control
                );
                Ok(Some(MatchedPair {
                    white: opponent,
                    black: entry.clone(),
                }))
            }
            // The opponent was claimed between scan and removal; the entrant
            // stays queued for the next join to pick up.
            Err(QueueRepositoryError::NotFound) => {
                debug!(
                    "Opponent {} vanished before removal, {} stays queued",
                    opponent.player_id, entry.player_id
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn leave_queue(
        &self,
        player_id: &str,
    ) -> Result<Vec<String>, MatchmakingServiceError> {
        let affected = self.repository.leave(player_id).await?;
        if !affected.is_empty() {
            info!("Player {} left queue", player_id);
        }
        Ok(affected)
    }

    pub async fn cleanup_stale(&self) -> Result<Vec<String>, MatchmakingServiceError> {
        let affected = self
            .repository
            .cleanup(Duration::minutes(MAX_QUEUE_WAIT_MINUTES))
            .await?;
        Ok(affected)
    }

    pub async fn queue_size(&self, time_control: &str) -> usize {
        self.repository.queue_size(time_control).await
    }
}
