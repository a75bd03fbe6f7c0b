//! # face-queue: durable priority task queue
//!
//! Producers submit [`JobRecord`]s; consumers take them back out one at a
//! time, highest priority first. The queue is backed by a score-ordered set:
//!
//! - **Duplicate collapse**: a record's canonical JSON encoding is its store
//!   identity, so submitting an identical record twice leaves one entry.
//! - **At-most-once dequeue**: pop-highest is a single atomic store operation;
//!   two concurrent consumers never receive the same record.
//! - **Bounded calls**: every store operation carries a deadline and failures
//!   surface as [`QueueError`] values, never as panics.
//!
//! ## Quick start
//!
//! ```rust
//! use face_queue::{JobRecord, MemoryStore, TaskQueue};
//!
//! # tokio_test::block_on(async {
//! let queue = TaskQueue::new(MemoryStore::new());
//!
//! queue.enqueue_task(&JobRecord::new("a", 7, "photo-1").with_priority(1)).await?;
//! queue.enqueue_task(&JobRecord::new("b", 7, "photo-2").with_priority(5)).await?;
//!
//! let next = queue.dequeue_task().await?.expect("queue has jobs");
//! assert_eq!(next.job_id.as_str(), "b");
//! assert_eq!(queue.queue_length().await, 1);
//! # Ok::<(), face_queue::QueueError>(())
//! # });
//! ```
//!
//! ## Backends
//!
//! - `MemoryStore` (feature `memory`): in-process, for tests and development
//! - `RedisStore` (feature `redis`): a Redis sorted set via `ZADD NX` / `ZPOPMAX`

pub mod adapter;
pub mod backend;
pub mod codec;
pub mod error;
pub mod types;
pub mod worker;

pub use adapter::{QueueConfig, TaskQueue};
pub use backend::PriorityStore;
pub use codec::{json::JsonCodec, RecordCodec};
pub use error::{JobError, QueueError, QueueResult};
pub use types::{JobId, JobRecord, JobStatus, Priority, TaskResponse};
pub use worker::{TaskHandler, Worker, WorkerConfig, WorkerHandle, WorkerStats};

#[cfg(feature = "memory")]
pub use backend::memory::MemoryStore;

#[cfg(feature = "redis")]
pub use backend::redis::RedisStore;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        JobError, JobId, JobRecord, JobStatus, Priority, PriorityStore, QueueConfig, QueueError,
        QueueResult, TaskHandler, TaskQueue, TaskResponse, Worker, WorkerConfig,
    };

    #[cfg(feature = "memory")]
    pub use crate::MemoryStore;

    #[cfg(feature = "redis")]
    pub use crate::RedisStore;
}
