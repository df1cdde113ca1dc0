use crate::errors::IndexError;
use crate::issue::{IssueId, ModelVersion};

/// Approximate nearest-neighbor store over issue vectors.
///
/// Strategies are swappable behind this trait: an exact brute-force scan
/// for small corpora and tests, an HNSW graph for production scale. Both
/// honor the same ordering contract so one property suite covers them.
///
/// The index exclusively owns its entries. Queries return copied ids and
/// distances, never references into index internals, so callers cannot
/// corrupt stored vectors after insertion.
pub trait VectorIndex: Send + Sync {
    /// Add an entry. Incremental — no full rebuild.
    ///
    /// # Errors
    /// `DuplicateId` if `(issue_id, model_version)` is already present,
    /// `DimensionMismatch` if the vector length is wrong.
    fn insert(
        &mut self,
        issue_id: IssueId,
        vector: Vec<f32>,
        model_version: &ModelVersion,
    ) -> Result<(), IndexError>;

    /// Delete an entry (issue edited or re-embedded).
    ///
    /// # Errors
    /// `NotFound` if the pair is absent.
    fn remove(&mut self, issue_id: IssueId, model_version: &ModelVersion)
        -> Result<(), IndexError>;

    /// Up to `k` nearest entries of `model_version`, ascending by
    /// distance; equal distances rank earlier-inserted entries first.
    ///
    /// Entries of other model versions are invisible. Fewer than `k`
    /// results means the index holds fewer than `k` entries of that
    /// version — never an error.
    fn query(
        &self,
        vector: &[f32],
        k: usize,
        model_version: &ModelVersion,
    ) -> Result<Vec<(IssueId, f32)>, IndexError>;

    /// Number of live entries for a model version.
    fn len(&self, model_version: &ModelVersion) -> usize;

    /// Number of live entries across all model versions.
    fn total_len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    /// Configured vector dimensionality.
    fn dimensions(&self) -> usize;

    /// Serialize all live entries for the storage collaborator.
    fn export_snapshot(&self) -> Result<Vec<u8>, IndexError>;

    /// Replace contents from a serialized snapshot.
    ///
    /// # Errors
    /// `CorruptSnapshot` on malformed input or dimension/metric mismatch;
    /// the prior in-memory state is untouched on failure.
    fn load_snapshot(&mut self, blob: &[u8]) -> Result<(), IndexError>;
}
