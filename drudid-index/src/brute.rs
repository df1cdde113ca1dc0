//! Exact brute-force index.
//!
//! Linear scan over all entries, parallelized with rayon. This is the
//! reference implementation of the ordering contract: every other
//! strategy must agree with it on small corpora.

use std::collections::HashMap;

use rayon::prelude::*;

use drudid_core::errors::IndexError;
use drudid_core::issue::{IssueId, ModelVersion};
use drudid_core::metric::DistanceMetric;
use drudid_core::traits::VectorIndex;

use crate::entry::{IndexEntry, VersionKey};
use crate::snapshot;

/// Exact nearest-neighbor index.
pub struct BruteForceIndex {
    dimensions: usize,
    metric: DistanceMetric,
    entries: Vec<IndexEntry>,
    /// Key → seq of the live entry.
    by_key: HashMap<VersionKey, u64>,
    next_seq: u64,
}

impl BruteForceIndex {
    pub fn new(dimensions: usize, metric: DistanceMetric) -> Self {
        Self {
            dimensions,
            metric,
            entries: Vec::new(),
            by_key: HashMap::new(),
            next_seq: 0,
        }
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                got: vector.len(),
            });
        }
        Ok(())
    }
}

impl VectorIndex for BruteForceIndex {
    fn insert(
        &mut self,
        issue_id: IssueId,
        vector: Vec<f32>,
        model_version: &ModelVersion,
    ) -> Result<(), IndexError> {
        self.check_dimensions(&vector)?;

        let key = (issue_id, model_version.clone());
        if self.by_key.contains_key(&key) {
            return Err(IndexError::DuplicateId {
                issue_id,
                model_version: model_version.clone(),
            });
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.by_key.insert(key, seq);
        self.entries.push(IndexEntry {
            issue_id,
            model_version: model_version.clone(),
            vector,
            seq,
        });
        Ok(())
    }

    fn remove(
        &mut self,
        issue_id: IssueId,
        model_version: &ModelVersion,
    ) -> Result<(), IndexError> {
        let key = (issue_id, model_version.clone());
        let seq = self.by_key.remove(&key).ok_or_else(|| IndexError::NotFound {
            issue_id,
            model_version: model_version.clone(),
        })?;

        // Position lookup is O(n); ordering is carried by seq, so
        // swap_remove is safe.
        if let Some(pos) = self.entries.iter().position(|e| e.seq == seq) {
            self.entries.swap_remove(pos);
        }
        Ok(())
    }

    fn query(
        &self,
        vector: &[f32],
        k: usize,
        model_version: &ModelVersion,
    ) -> Result<Vec<(IssueId, f32)>, IndexError> {
        self.check_dimensions(vector)?;

        let mut scored: Vec<(IssueId, f32, u64)> = self
            .entries
            .par_iter()
            .filter(|e| &e.model_version == model_version)
            .map(|e| (e.issue_id, self.metric.distance(vector, &e.vector), e.seq))
            .collect();

        scored.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)));
        scored.truncate(k);
        Ok(scored.into_iter().map(|(id, d, _)| (id, d)).collect())
    }

    fn len(&self, model_version: &ModelVersion) -> usize {
        self.by_key.keys().filter(|(_, v)| v == model_version).count()
    }

    fn total_len(&self) -> usize {
        self.entries.len()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn export_snapshot(&self) -> Result<Vec<u8>, IndexError> {
        snapshot::encode(self.dimensions, self.metric, self.entries.clone())
    }

    fn load_snapshot(&mut self, blob: &[u8]) -> Result<(), IndexError> {
        let entries = snapshot::decode(blob, self.dimensions, self.metric)?;

        // Decoded and validated; only now touch our own state.
        let by_key = entries.iter().map(|e| (e.key(), e.seq)).collect();
        self.next_seq = entries.last().map(|e| e.seq + 1).unwrap_or(0);
        self.by_key = by_key;
        self.entries = entries;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v1() -> ModelVersion {
        ModelVersion::new("v1")
    }

    fn index() -> BruteForceIndex {
        BruteForceIndex::new(2, DistanceMetric::Cosine)
    }

    #[test]
    fn insert_then_query_finds_entry() {
        let mut idx = index();
        idx.insert(IssueId(1), vec![1.0, 0.0], &v1()).unwrap();
        let results = idx.query(&[1.0, 0.0], 5, &v1()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, IssueId(1));
        assert!(results[0].1.abs() < 1e-6);
    }

    #[test]
    fn duplicate_insert_fails_and_leaves_count_unchanged() {
        let mut idx = index();
        idx.insert(IssueId(1), vec![1.0, 0.0], &v1()).unwrap();
        let err = idx.insert(IssueId(1), vec![0.0, 1.0], &v1()).unwrap_err();
        assert!(matches!(err, IndexError::DuplicateId { .. }));
        assert_eq!(idx.total_len(), 1);
    }

    #[test]
    fn same_issue_under_two_versions_is_allowed() {
        let mut idx = index();
        idx.insert(IssueId(1), vec![1.0, 0.0], &v1()).unwrap();
        idx.insert(IssueId(1), vec![1.0, 0.0], &ModelVersion::new("v2"))
            .unwrap();
        assert_eq!(idx.total_len(), 2);
        assert_eq!(idx.len(&v1()), 1);
    }

    #[test]
    fn remove_absent_entry_is_not_found() {
        let mut idx = index();
        let err = idx.remove(IssueId(9), &v1()).unwrap_err();
        assert!(matches!(err, IndexError::NotFound { .. }));
    }

    #[test]
    fn wrong_width_vector_is_rejected() {
        let mut idx = index();
        let err = idx.insert(IssueId(1), vec![1.0, 0.0, 0.0], &v1()).unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 2,
                got: 3
            }
        ));
    }

    #[test]
    fn results_sorted_ascending_with_insertion_tie_break() {
        let mut idx = index();
        // Two entries at identical distance from the query, one closer.
        idx.insert(IssueId(10), vec![0.0, 1.0], &v1()).unwrap();
        idx.insert(IssueId(20), vec![0.0, 1.0], &v1()).unwrap();
        idx.insert(IssueId(30), vec![1.0, 0.0], &v1()).unwrap();

        let results = idx.query(&[1.0, 0.0], 3, &v1()).unwrap();
        assert_eq!(results[0].0, IssueId(30));
        // Equal distances: earlier insertion first.
        assert_eq!(results[1].0, IssueId(10));
        assert_eq!(results[2].0, IssueId(20));
    }

    #[test]
    fn other_model_versions_are_invisible() {
        let mut idx = index();
        idx.insert(IssueId(1), vec![1.0, 0.0], &v1()).unwrap();
        idx.insert(IssueId(2), vec![1.0, 0.0], &ModelVersion::new("v2"))
            .unwrap();
        let results = idx.query(&[1.0, 0.0], 10, &v1()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, IssueId(1));
    }

    #[test]
    fn k_larger_than_index_returns_all_without_error() {
        let mut idx = index();
        for i in 0..3 {
            idx.insert(IssueId(i), vec![i as f32, 1.0], &v1()).unwrap();
        }
        let results = idx.query(&[1.0, 0.0], 10, &v1()).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn insert_remove_reinsert_equals_single_insert() {
        let mut churned = index();
        churned.insert(IssueId(1), vec![1.0, 0.0], &v1()).unwrap();
        churned.remove(IssueId(1), &v1()).unwrap();
        churned.insert(IssueId(1), vec![0.5, 0.5], &v1()).unwrap();

        let mut fresh = index();
        fresh.insert(IssueId(1), vec![0.5, 0.5], &v1()).unwrap();

        let q = [0.7, 0.3];
        assert_eq!(
            churned.query(&q, 5, &v1()).unwrap(),
            fresh.query(&q, 5, &v1()).unwrap()
        );
    }

    #[test]
    fn snapshot_round_trip_is_query_equivalent() {
        let mut idx = index();
        idx.insert(IssueId(1), vec![1.0, 0.0], &v1()).unwrap();
        idx.insert(IssueId(2), vec![0.0, 1.0], &v1()).unwrap();
        idx.insert(IssueId(3), vec![0.6, 0.8], &v1()).unwrap();

        let blob = idx.export_snapshot().unwrap();
        let mut restored = index();
        restored.load_snapshot(&blob).unwrap();

        let q = [0.8, 0.6];
        assert_eq!(
            idx.query(&q, 10, &v1()).unwrap(),
            restored.query(&q, 10, &v1()).unwrap()
        );
    }

    #[test]
    fn failed_load_leaves_prior_state_untouched() {
        let mut idx = index();
        idx.insert(IssueId(1), vec![1.0, 0.0], &v1()).unwrap();
        let err = idx.load_snapshot(b"garbage").unwrap_err();
        assert!(matches!(err, IndexError::CorruptSnapshot { .. }));
        assert_eq!(idx.total_len(), 1);
        assert_eq!(idx.query(&[1.0, 0.0], 1, &v1()).unwrap()[0].0, IssueId(1));
    }

    #[test]
    fn insertion_after_load_continues_the_sequence() {
        let mut idx = index();
        idx.insert(IssueId(1), vec![0.0, 1.0], &v1()).unwrap();
        idx.insert(IssueId(2), vec![0.0, 1.0], &v1()).unwrap();

        let blob = idx.export_snapshot().unwrap();
        let mut restored = index();
        restored.load_snapshot(&blob).unwrap();
        restored.insert(IssueId(3), vec![0.0, 1.0], &v1()).unwrap();

        // All three at identical distance: order must be insertion order.
        let results = restored.query(&[1.0, 0.0], 3, &v1()).unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec![IssueId(1), IssueId(2), IssueId(3)]);
    }
}
