use crate::issue::{IssueId, ModelVersion};

/// Vector index errors.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Integrity violation: an entry for this (issue, model version) pair
    /// already exists. Never silently overwritten.
    #[error("entry already indexed for {issue_id} under model {model_version}")]
    DuplicateId {
        issue_id: IssueId,
        model_version: ModelVersion,
    },

    #[error("no entry for {issue_id} under model {model_version}")]
    NotFound {
        issue_id: IssueId,
        model_version: ModelVersion,
    },

    #[error("vector has {got} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Malformed persisted state. Load aborts; prior in-memory state is
    /// untouched.
    #[error("corrupt snapshot: {reason}")]
    CorruptSnapshot { reason: String },
}
