use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use redis::Client;
use tokio::sync::mpsc;

use crate::error::{AppError, AppResult};
use crate::models::{CachedRecommendationSet, RecommendationResult};

/// Short-lived per-user snapshot storage for recommendation sets
///
/// `get` distinguishes a miss (no snapshot, or an expired one) from a present
/// snapshot — including a present-but-empty one. `put` replaces the user's
/// snapshot wholesale under a fresh expiry; there is no partial update.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationCache: Send + Sync {
    /// Returns the user's snapshot if one exists and is still fresh
    async fn get(&self, user_id: &str) -> AppResult<Option<CachedRecommendationSet>>;

    /// Replaces the user's snapshot; the write completes in the background
    fn put(&self, user_id: &str, results: &[RecommendationResult]);
}

fn snapshot_key(user_id: &str) -> String {
    format!("recs:{}", user_id)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Redis-backed recommendation cache
///
/// Writes go through a background task so that storing a freshly generated
/// set never delays the response carrying it. Freshness is enforced twice:
/// a Redis TTL evicts the key, and the embedded `expires_at` is checked on
/// read so a not-yet-evicted stale snapshot is still treated as a miss.
#[derive(Clone)]
pub struct RedisRecommendationCache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
    ttl: Duration,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task to flush pending writes and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl RedisRecommendationCache {
    /// Creates the cache and spawns its background writer task
    pub async fn new(redis_client: Client, ttl: Duration) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
            ttl,
        };

        let handle = CacheWriterHandle { shutdown_tx };

        (cache, handle)
    }

    /// Drains write messages into Redis until shut down
    ///
    /// On the shutdown signal, remaining queued messages are flushed before
    /// the task exits.
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::error!(error = %e, "Failed to write recommendation snapshot");
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Cache writer shutting down, flushing remaining writes");

                    while let Ok(msg) = write_rx.try_recv() {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::error!(error = %e, "Failed to flush snapshot during shutdown");
                        }
                    }

                    tracing::info!("Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }
}

#[async_trait]
impl RecommendationCache for RedisRecommendationCache {
    async fn get(&self, user_id: &str) -> AppResult<Option<CachedRecommendationSet>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(snapshot_key(user_id)).await?;

        let Some(json) = cached else {
            return Ok(None);
        };

        let snapshot: CachedRecommendationSet = serde_json::from_str(&json)
            .map_err(|e| AppError::Internal(format!("Cache deserialization error: {}", e)))?;

        // A snapshot Redis has not evicted yet can still be past its expiry
        if !snapshot.is_fresh(Utc::now()) {
            tracing::debug!(user_id = %user_id, "Cached snapshot expired, treating as miss");
            return Ok(None);
        }

        Ok(Some(snapshot))
    }

    fn put(&self, user_id: &str, results: &[RecommendationResult]) {
        let snapshot = CachedRecommendationSet {
            results: results.to_vec(),
            expires_at: Utc::now()
                + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::zero()),
        };

        let json = match serde_json::to_string(&snapshot) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: snapshot_key(user_id),
            value: json,
            ttl: self.ttl.as_secs(),
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}
