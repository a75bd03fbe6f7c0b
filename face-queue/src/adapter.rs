use std::sync::Arc;
use std::time::Duration;

use face_core::{ConfigError, ConfigSnapshot};
use tracing::{debug, info, instrument, warn};

use crate::{
    backend::PriorityStore,
    codec::{json::JsonCodec, RecordCodec},
    JobId, JobRecord, Priority, QueueError, QueueResult, TaskResponse,
};

/// Configuration for the queue gateway and its store
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Connection URL of the backing store
    pub redis_url: String,
    /// Name of the sorted set holding pending jobs
    pub queue_key: String,
    /// Upper bound on every single store operation
    pub op_timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379/0".to_string(),
            queue_key: "face_tasks".to_string(),
            op_timeout: Duration::from_secs(5),
        }
    }
}

impl QueueConfig {
    /// Read `redis.url`, `queue.key` and `queue.op_timeout_ms`
    pub fn from_config(config: &ConfigSnapshot) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            redis_url: config.get_string("redis.url").unwrap_or(defaults.redis_url),
            queue_key: config.get_string("queue.key").unwrap_or(defaults.queue_key),
            op_timeout: config
                .parse::<u64>("queue.op_timeout_ms")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.op_timeout),
        })
    }
}

/// Gateway between job records and the priority store.
///
/// Records are encoded to their canonical string form and inserted with
/// their priority as score, so resubmitting an identical record is a no-op.
/// Dequeue pops the highest-priority member and decodes it.
pub struct TaskQueue<S: PriorityStore + ?Sized> {
    store: Arc<S>,
    codec: Arc<dyn RecordCodec>,
}

impl<S: PriorityStore + ?Sized> Clone for TaskQueue<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl<S: PriorityStore> TaskQueue<S> {
    /// Create a gateway that owns `store`
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }
}

impl<S: PriorityStore + ?Sized> TaskQueue<S> {
    /// Create a gateway over a store that is shared with other owners
    pub fn from_shared(store: Arc<S>) -> Self {
        Self {
            store,
            codec: Arc::new(JsonCodec),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Queue a job under its priority.
    ///
    /// A record whose encoding is already present is left in place and the
    /// call still succeeds. On error the job is not guaranteed to be queued.
    #[instrument(skip(self, record), fields(job_id = %record.job_id, priority = %record.priority))]
    pub async fn enqueue_task(&self, record: &JobRecord) -> QueueResult<JobId> {
        let member = self
            .codec
            .encode(record)
            .map_err(QueueError::enqueue_failed)?;

        if !record.priority.is_conventional() {
            debug!(
                "Priority {} is outside {}..={}",
                record.priority,
                Priority::LOWEST,
                Priority::HIGHEST
            );
        }

        if let Err(e) = self.store.insert(&member, record.score()).await {
            warn!("Failed to enqueue job {}: {}", record.job_id, e);
            return Err(QueueError::enqueue_failed(e));
        }

        info!(
            "Enqueued job {} on {} store as {}",
            record.job_id,
            self.store.backend_name(),
            self.codec.codec_id()
        );
        Ok(record.job_id.clone())
    }

    /// Remove and return the highest-priority job, if any.
    ///
    /// A popped member that cannot be decoded is gone from the store; the
    /// raw member is logged and the call fails with a serialization cause.
    #[instrument(skip(self))]
    pub async fn dequeue_task(&self) -> QueueResult<Option<JobRecord>> {
        let member = match self.store.pop_highest().await {
            Ok(Some(member)) => member,
            Ok(None) => {
                debug!("Queue is empty");
                return Ok(None);
            }
            Err(e) => {
                warn!("Failed to dequeue: {}", e);
                return Err(QueueError::dequeue_failed(e));
            }
        };

        match self.codec.decode(&member) {
            Ok(record) => {
                info!("Dequeued job {} (priority {})", record.job_id, record.priority);
                Ok(Some(record))
            }
            Err(e) => {
                warn!(member = %member, "Dropping undecodable queue member: {}", e);
                Err(QueueError::dequeue_failed(e))
            }
        }
    }

    /// Number of queued jobs; 0 when the store cannot answer
    pub async fn queue_length(&self) -> usize {
        self.store.size().await
    }

    /// Enqueue and translate the outcome into a producer-facing response
    pub async fn submit(&self, record: &JobRecord) -> TaskResponse {
        match self.enqueue_task(record).await {
            Ok(job_id) => TaskResponse::pending(job_id),
            Err(e) => TaskResponse::error(record.job_id.clone(), e.to_string()),
        }
    }
}
