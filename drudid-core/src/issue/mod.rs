pub mod base;
pub mod candidate;
pub mod confidence;

pub use base::{Issue, IssueId, ModelVersion};
pub use candidate::CandidateMatch;
pub use confidence::Confidence;
