use crate::{codec::RecordCodec, JobRecord, QueueError, QueueResult};

/// JSON codec for job records.
///
/// Field order follows the struct and metadata keys are kept sorted, so the
/// output is canonical for a given record.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec;

impl RecordCodec for JsonCodec {
    fn encode(&self, record: &JobRecord) -> QueueResult<String> {
        serde_json::to_string(record).map_err(|e| QueueError::serialization(e.to_string()))
    }

    fn decode(&self, member: &str) -> QueueResult<JobRecord> {
        serde_json::from_str(member).map_err(|e| QueueError::serialization(e.to_string()))
    }

    fn codec_id(&self) -> &'static str {
        "json"
    }
}
