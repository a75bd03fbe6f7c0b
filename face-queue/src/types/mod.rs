pub mod ids;
pub mod priority;
pub mod record;

pub use ids::JobId;
pub use priority::Priority;
pub use record::{JobRecord, JobStatus, TaskResponse};
