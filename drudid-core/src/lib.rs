//! # drudid-core
//!
//! Foundation crate for the drudid duplicate-issue detection engine.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod issue;
pub mod metric;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::EngineConfig;
pub use errors::{DrudidError, DrudidResult, EncodingError, IndexError};
pub use issue::{CandidateMatch, Confidence, Issue, IssueId, ModelVersion};
pub use metric::DistanceMetric;
pub use traits::{TextEncoder, VectorIndex};
