#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis;

use async_trait::async_trait;

use crate::{types::priority::Score, QueueResult};

/// Backend trait for the durable, score-ordered member set.
///
/// Members are encoded job records; the member itself is the identity key.
#[async_trait]
pub trait PriorityStore: Send + Sync {
    /// Add `member` under `score`.
    ///
    /// A member that is already present is left untouched and the call still
    /// succeeds.
    async fn insert(&self, member: &str, score: Score) -> QueueResult<()>;

    /// Remove and return the member with the highest score in one atomic step.
    ///
    /// Ties resolve to the lexicographically greatest member. Two concurrent
    /// callers never receive the same member. A failure reported by the store
    /// itself removes nothing; a client-side deadline that expires after the
    /// store already popped loses that member (see `RedisStore`).
    async fn pop_highest(&self) -> QueueResult<Option<String>>;

    /// Current number of members.
    ///
    /// Advisory only: backend errors are logged and reported as 0.
    async fn size(&self) -> usize;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
