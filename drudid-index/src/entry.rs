use serde::{Deserialize, Serialize};

use drudid_core::issue::{IssueId, ModelVersion};

/// One indexed vector. Owned exclusively by the index; immutable once
/// inserted — re-embedding an edited issue is remove + insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub issue_id: IssueId,
    pub model_version: ModelVersion,
    pub vector: Vec<f32>,
    /// Monotonic insertion sequence; the distance tie-break.
    pub seq: u64,
}

/// Uniqueness key: one vector per issue per model version.
pub type VersionKey = (IssueId, ModelVersion);

impl IndexEntry {
    pub fn key(&self) -> VersionKey {
        (self.issue_id, self.model_version.clone())
    }
}
