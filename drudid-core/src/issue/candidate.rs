use serde::{Deserialize, Serialize};

use super::{Confidence, IssueId};

/// One ranked duplicate candidate for a query.
///
/// Ephemeral — produced per `find_duplicates` call and never persisted by
/// the core. Persisting accepted duplicate links is the storage
/// collaborator's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub issue_id: IssueId,
    /// Raw distance under the configured metric (lower is closer).
    pub distance: f32,
    /// Calibrated duplicate confidence.
    pub confidence: Confidence,
    /// Position in the ranked result, starting at 1.
    pub rank: usize,
}
