//! Ephemeral matching queue over Redis.
//!
//! Pending match requests live in a single Redis hash keyed by session id.
//! The store must tolerate total absence of Redis (development mode): a
//! disabled queue turns every operation into a safe no-op instead of
//! erroring into the matching core.

use anyhow::Result;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::sync::Mutex;

use super::models::MatchRequest;

/// Redis hash holding all pending match requests.
const MATCHING_QUEUE_KEY: &str = "matching_queue";

/// Contract the matching core requires from the queue store.
///
/// `list_all` order is whatever the store returns; the engine treats that
/// order as the only tie-break for which entries head a theme bucket.
#[async_trait]
pub trait BaseMatchQueue: Send + Sync {
    async fn enqueue(&self, request: &MatchRequest) -> Result<()>;

    async fn dequeue(&self, session_id: &str) -> Result<()>;

    async fn list_all(&self) -> Result<Vec<MatchRequest>>;

    async fn clear(&self) -> Result<()>;
}

/// Redis-backed matching queue.
pub struct RedisMatchQueue {
    conn: Option<ConnectionManager>,
}

impl RedisMatchQueue {
    /// Connect to Redis, degrading to a disabled queue on any failure so
    /// the rest of the service still boots.
    pub async fn connect(url: &str) -> Self {
        let client = match Client::open(url) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid REDIS_URL - matching queue disabled");
                return Self::disabled();
            }
        };

        match ConnectionManager::new(client).await {
            Ok(conn) => {
                tracing::info!("Redis connected");
                Self { conn: Some(conn) }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to connect to Redis - matching queue disabled");
                Self::disabled()
            }
        }
    }

    /// Queue with no backing store; every operation is a safe no-op.
    pub fn disabled() -> Self {
        Self { conn: None }
    }

    fn connection(&self) -> Option<ConnectionManager> {
        self.conn.clone()
    }
}

#[async_trait]
impl BaseMatchQueue for RedisMatchQueue {
    async fn enqueue(&self, request: &MatchRequest) -> Result<()> {
        let Some(mut conn) = self.connection() else {
            tracing::warn!("Matching queue unavailable - skipping enqueue");
            return Ok(());
        };

        let payload = serde_json::to_string(request)?;
        let _: () = conn
            .hset(MATCHING_QUEUE_KEY, &request.session_id, payload)
            .await?;
        Ok(())
    }

    async fn dequeue(&self, session_id: &str) -> Result<()> {
        let Some(mut conn) = self.connection() else {
            return Ok(());
        };

        let _: () = conn.hdel(MATCHING_QUEUE_KEY, session_id).await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<MatchRequest>> {
        let Some(mut conn) = self.connection() else {
            return Ok(Vec::new());
        };

        // Decode as entry pairs rather than a map so the reply order is
        // preserved; that order is the engine's tie-break.
        let entries: Vec<(String, String)> = conn.hgetall(MATCHING_QUEUE_KEY).await?;

        let mut requests = Vec::with_capacity(entries.len());
        for (session_id, payload) in entries {
            match serde_json::from_str::<MatchRequest>(&payload) {
                Ok(request) => requests.push(request),
                Err(e) => {
                    tracing::warn!(
                        session_id = %session_id,
                        error = %e,
                        "Dropping unparseable queue entry"
                    );
                }
            }
        }
        Ok(requests)
    }

    async fn clear(&self) -> Result<()> {
        let Some(mut conn) = self.connection() else {
            return Ok(());
        };

        let _: () = conn.del(MATCHING_QUEUE_KEY).await?;
        Ok(())
    }
}

/// In-memory queue for tests: preserves insertion order, replaces entries
/// that share a session id (hash semantics).
#[derive(Default)]
pub struct TestMatchQueue {
    entries: Mutex<Vec<MatchRequest>>,
}

impl TestMatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|r| r.session_id.clone())
            .collect()
    }
}

#[async_trait]
impl BaseMatchQueue for TestMatchQueue {
    async fn enqueue(&self, request: &MatchRequest) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|r| r.session_id != request.session_id);
        entries.push(request.clone());
        Ok(())
    }

    async fn dequeue(&self, session_id: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|r| r.session_id != session_id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<MatchRequest>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    async fn clear(&self) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::matching::models::{ComfortLevel, EmotionalTheme};

    fn request(session_id: &str) -> MatchRequest {
        MatchRequest {
            session_id: session_id.to_string(),
            theme: EmotionalTheme::Anxiety,
            intensity: 5,
            comfort_level: ComfortLevel::Listening,
            timezone: "UTC".to_string(),
            duration: 20,
            enqueued_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_disabled_queue_is_a_safe_no_op() {
        let queue = RedisMatchQueue::disabled();

        assert!(queue.enqueue(&request("a")).await.is_ok());
        assert!(queue.dequeue("a").await.is_ok());
        assert!(queue.clear().await.is_ok());
        assert!(queue.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_queue_preserves_order() {
        let queue = TestMatchQueue::new();

        queue.enqueue(&request("a")).await.unwrap();
        queue.enqueue(&request("b")).await.unwrap();
        queue.enqueue(&request("c")).await.unwrap();

        assert_eq!(queue.session_ids(), vec!["a", "b", "c"]);

        queue.dequeue("b").await.unwrap();
        assert_eq!(queue.session_ids(), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_in_memory_queue_replaces_duplicate_session() {
        let queue = TestMatchQueue::new();

        queue.enqueue(&request("a")).await.unwrap();
        let mut updated = request("a");
        updated.intensity = 9;
        queue.enqueue(&updated).await.unwrap();

        let entries = queue.list_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].intensity, 9);
    }
}
