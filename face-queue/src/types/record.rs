use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{JobId, Priority};
use super::priority::Score;

/// Job status lifecycle.
///
/// The queue only ever holds pending jobs; everything past `Pending` is
/// tracked by the consumer that dequeued the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Submitted and waiting in the queue
    #[default]
    Pending,

    /// Dequeued and currently being worked on
    InProgress,

    /// Finished successfully
    Done,

    /// Finished with an error
    Error,
}

impl JobStatus {
    /// Check if the job is in a terminal state (done or error)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// Get the status name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A unit of queued work.
///
/// While queued, the serialized form of the record is its identity in the
/// store: two records that serialize to the same bytes collapse into one
/// entry. Callers are responsible for keeping `job_id` unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// External handle, assigned by the producer
    pub job_id: JobId,

    /// Owner of the request
    pub user_id: i64,

    /// Identifier of the source item to process (e.g. a remote photo id)
    pub payload_ref: String,

    /// Free-form data, opaque to the queue
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,

    /// Higher sorts first; missing on ingress means 0
    #[serde(default)]
    pub priority: Priority,

    /// Consumer-owned; never stored, always `Pending` after deserialization
    #[serde(skip)]
    pub status: JobStatus,
}

impl JobRecord {
    /// Create a new pending record with default priority and no metadata
    pub fn new(job_id: impl Into<JobId>, user_id: i64, payload_ref: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            user_id,
            payload_ref: payload_ref.into(),
            metadata: None,
            priority: Priority::default(),
            status: JobStatus::Pending,
        }
    }

    /// Set the job priority
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Priority(priority);
        self
    }

    /// Replace the metadata map
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Add a single metadata entry, creating the map if needed
    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Score this record is stored under
    pub fn score(&self) -> Score {
        self.priority.score()
    }
}

/// Answer returned to a producer after a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    pub message: Option<String>,
}

impl TaskResponse {
    /// The job was accepted and is waiting in the queue
    pub fn pending(job_id: JobId) -> Self {
        Self {
            job_id,
            status: JobStatus::Pending,
            message: None,
        }
    }

    /// The job could not be queued
    pub fn error(job_id: JobId, message: impl Into<String>) -> Self {
        Self {
            job_id,
            status: JobStatus::Error,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_priority_and_metadata_default() {
        let record: JobRecord = serde_json::from_value(json!({
            "job_id": "a",
            "user_id": 7,
            "payload_ref": "photo-42"
        }))
        .unwrap();

        assert_eq!(record.priority, Priority(0));
        assert_eq!(record.metadata, None);
        assert_eq!(record.status, JobStatus::Pending);
    }

    #[test]
    fn status_is_not_serialized() {
        let mut record = JobRecord::new("a", 7, "photo-42").with_priority(5);
        record.status = JobStatus::Done;

        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("status").is_none());
        assert_eq!(value["priority"], json!(5));
        assert_eq!(value["job_id"], json!("a"));
    }

    #[test]
    fn metadata_entries_accumulate() {
        let record = JobRecord::new("a", 7, "photo-42")
            .with_metadata_entry("source", "bot")
            .with_metadata_entry("attempt", 2);

        let metadata = record.metadata.unwrap();
        assert_eq!(metadata["source"], json!("bot"));
        assert_eq!(metadata["attempt"], json!(2));
    }

    #[test]
    fn status_names_match_wire_format() {
        assert_eq!(serde_json::to_string(&JobStatus::InProgress).unwrap(), "\"in_progress\"");
        assert_eq!(JobStatus::Error.to_string(), "error");
        assert!(JobStatus::Done.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
    }

    #[test]
    fn task_response_shapes() {
        let ok = TaskResponse::pending(JobId::from("a"));
        assert_eq!(ok.status, JobStatus::Pending);
        assert_eq!(ok.message, None);

        let failed = TaskResponse::error(JobId::from("b"), "could not enqueue task");
        assert_eq!(failed.status, JobStatus::Error);
        assert_eq!(failed.message.as_deref(), Some("could not enqueue task"));
    }
}
