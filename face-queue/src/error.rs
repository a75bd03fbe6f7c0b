use thiserror::Error;

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Infrastructure errors for queue operations
#[derive(Error, Debug, Clone)]
pub enum QueueError {
    /// The backing store could not be reached or did not answer in time
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A job record could not be encoded, or a stored member could not be decoded
    #[error("Serialization fault: {0}")]
    SerializationFault(String),

    /// The job is not guaranteed to be queued
    #[error("Enqueue failed: {0}")]
    EnqueueFailed(#[source] Box<QueueError>),

    /// Nothing was handed to the caller
    #[error("Dequeue failed: {0}")]
    DequeueFailed(#[source] Box<QueueError>),
}

impl QueueError {
    /// Create a store-unavailable error
    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationFault(msg.into())
    }

    /// Wrap a lower-level failure as an enqueue failure
    pub fn enqueue_failed(cause: QueueError) -> Self {
        Self::EnqueueFailed(Box::new(cause))
    }

    /// Wrap a lower-level failure as a dequeue failure
    pub fn dequeue_failed(cause: QueueError) -> Self {
        Self::DequeueFailed(Box::new(cause))
    }

    /// The innermost cause, looking through the enqueue/dequeue wrappers
    pub fn cause(&self) -> &QueueError {
        match self {
            Self::EnqueueFailed(inner) | Self::DequeueFailed(inner) => inner.cause(),
            other => other,
        }
    }

    /// Check whether the root cause is an unreachable store
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self.cause(), Self::StoreUnavailable(_))
    }

    /// Check whether the root cause is a serialization problem
    pub fn is_serialization_fault(&self) -> bool {
        matches!(self.cause(), Self::SerializationFault(_))
    }
}

impl From<serde_json::Error> for QueueError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationFault(err.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for QueueError {
    fn from(err: redis::RedisError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

/// Job execution failure reported by a task handler
#[derive(Error, Debug, Clone)]
pub enum JobError {
    /// The handler ran and could not finish the job
    #[error("Job failed: {0}")]
    Failed(String),

    /// The handler panicked
    #[error("Job handler panicked: {0}")]
    Panicked(String),
}

impl JobError {
    /// Create a generic failure
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}
