pub mod candidate;
pub mod job;
pub mod telemetry;

pub use candidate::Candidate;
pub use job::{Job, Skill};
pub use telemetry::{FeedbackDirection, FeedbackRecord, QualitySnapshot};
