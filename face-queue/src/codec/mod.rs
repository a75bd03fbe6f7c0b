pub mod json;

use crate::{JobRecord, QueueResult};

/// Turns job records into store members and back.
///
/// The encoded member doubles as the record's identity in the store, so an
/// implementation must be deterministic: equal records must always encode to
/// equal strings.
pub trait RecordCodec: Send + Sync {
    /// Encode a record into a store member
    fn encode(&self, record: &JobRecord) -> QueueResult<String>;

    /// Decode a store member back into a record
    fn decode(&self, member: &str) -> QueueResult<JobRecord>;

    /// Get codec identifier
    fn codec_id(&self) -> &'static str;
}
