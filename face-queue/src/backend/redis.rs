use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::{debug, info, warn};

use crate::{
    adapter::QueueConfig, backend::PriorityStore, types::priority::Score, QueueError, QueueResult,
};

/// Sorted-set backend on a Redis server.
///
/// Every command is bounded by `op_timeout`; an expired deadline is reported
/// as an unavailable store. Pop-highest relies on `ZPOPMAX`, which the server
/// executes atomically.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    key: String,
    op_timeout: Duration,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("connection", &"ConnectionManager")
            .field("key", &self.key)
            .field("op_timeout", &self.op_timeout)
            .finish()
    }
}

impl RedisStore {
    /// Open a managed connection and check it with `PING`
    pub async fn connect(config: &QueueConfig) -> QueueResult<Self> {
        info!("Connecting to Redis queue store at {}", config.redis_url);

        let client = redis::Client::open(config.redis_url.as_str()).map_err(|e| {
            QueueError::store_unavailable(format!("Failed to create Redis client: {e}"))
        })?;

        let conn = tokio::time::timeout(config.op_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| QueueError::store_unavailable("Timed out connecting to Redis"))?
            .map_err(|e| QueueError::store_unavailable(format!("Failed to connect to Redis: {e}")))?;

        let store = Self {
            conn,
            key: config.queue_key.clone(),
            op_timeout: config.op_timeout,
        };

        let mut conn = store.conn.clone();
        let _: String = store
            .bounded("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;

        info!("Connected to Redis queue store, key {}", store.key);
        Ok(store)
    }

    /// Sorted-set key this store reads and writes
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Run one command under the operation deadline
    async fn bounded<T, F>(&self, op: &str, fut: F) -> QueueResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(QueueError::store_unavailable(format!("Redis {op} failed: {e}"))),
            Err(_) => Err(QueueError::store_unavailable(format!(
                "Redis {op} timed out after {:?}",
                self.op_timeout
            ))),
        }
    }
}

#[async_trait]
impl PriorityStore for RedisStore {
    async fn insert(&self, member: &str, score: Score) -> QueueResult<()> {
        let mut conn = self.conn.clone();
        let added: i64 = self
            .bounded(
                "ZADD",
                redis::cmd("ZADD")
                    .arg(&self.key)
                    .arg("NX")
                    .arg(score)
                    .arg(member)
                    .query_async(&mut conn),
            )
            .await?;

        if added == 0 {
            debug!("Member already queued under {}", self.key);
        }
        Ok(())
    }

    /// `ZPOPMAX key 1` under `op_timeout`.
    ///
    /// The deadline is enforced on the client. If it expires after the server
    /// has executed the pop, the member is gone from the set while the caller
    /// gets `StoreUnavailable`. Delivery is therefore at most once, never
    /// duplicated; callers that cannot afford the loss should use a generous
    /// `queue.op_timeout_ms`.
    async fn pop_highest(&self) -> QueueResult<Option<String>> {
        let mut conn = self.conn.clone();

        // Reply is a flat [member, score] pair, or empty when the set is empty
        let reply: Vec<String> = self
            .bounded(
                "ZPOPMAX",
                redis::cmd("ZPOPMAX")
                    .arg(&self.key)
                    .arg(1)
                    .query_async(&mut conn),
            )
            .await?;

        Ok(reply.into_iter().next())
    }

    async fn size(&self) -> usize {
        let mut conn = self.conn.clone();
        let result: QueueResult<usize> = self
            .bounded("ZCARD", redis::cmd("ZCARD").arg(&self.key).query_async(&mut conn))
            .await;

        match result {
            Ok(count) => count,
            Err(e) => {
                warn!("Could not read queue length for {}: {}", self.key, e);
                0
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
