//! Property tests run against both index strategies.
//!
//! The brute-force index defines the ordering contract; the HNSW index
//! must honor the same properties (and, at full effort on small corpora,
//! the same results).

use proptest::prelude::*;

use drudid_core::issue::{IssueId, ModelVersion};
use drudid_core::metric::DistanceMetric;
use drudid_core::traits::VectorIndex;
use drudid_index::{BruteForceIndex, HnswIndex};

const DIMS: usize = 8;

fn version() -> ModelVersion {
    ModelVersion::new("prop-v1")
}

fn strategies() -> Vec<Box<dyn VectorIndex>> {
    vec![
        Box::new(BruteForceIndex::new(DIMS, DistanceMetric::Cosine)),
        Box::new(HnswIndex::new(DIMS, DistanceMetric::Cosine, 256)),
    ]
}

fn vector_strategy() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1.0f32..1.0, DIMS)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn query_results_sorted_non_decreasing(
        vectors in prop::collection::vec(vector_strategy(), 1..40),
        query in vector_strategy(),
        k in 1usize..20,
    ) {
        for mut index in strategies() {
            for (i, v) in vectors.iter().enumerate() {
                index.insert(IssueId(i as u64), v.clone(), &version()).unwrap();
            }
            let results = index.query(&query, k, &version()).unwrap();
            prop_assert!(results.len() <= k);
            for pair in results.windows(2) {
                prop_assert!(pair[0].1 <= pair[1].1);
            }
        }
    }

    #[test]
    fn result_count_is_min_of_k_and_size(
        vectors in prop::collection::vec(vector_strategy(), 0..30),
        query in vector_strategy(),
        k in 1usize..40,
    ) {
        for mut index in strategies() {
            for (i, v) in vectors.iter().enumerate() {
                index.insert(IssueId(i as u64), v.clone(), &version()).unwrap();
            }
            let results = index.query(&query, k, &version()).unwrap();
            prop_assert_eq!(results.len(), k.min(vectors.len()));
        }
    }

    #[test]
    fn snapshot_round_trip_preserves_query_results(
        vectors in prop::collection::vec(vector_strategy(), 1..30),
        query in vector_strategy(),
    ) {
        for mut index in strategies() {
            for (i, v) in vectors.iter().enumerate() {
                index.insert(IssueId(i as u64), v.clone(), &version()).unwrap();
            }
            let before = index.query(&query, 10, &version()).unwrap();
            let blob = index.export_snapshot().unwrap();
            index.load_snapshot(&blob).unwrap();
            let after = index.query(&query, 10, &version()).unwrap();
            prop_assert_eq!(before, after);
        }
    }

    #[test]
    fn hnsw_matches_brute_force_on_small_corpora(
        vectors in prop::collection::vec(vector_strategy(), 1..25),
        query in vector_strategy(),
        k in 1usize..10,
    ) {
        let mut brute = BruteForceIndex::new(DIMS, DistanceMetric::Cosine);
        let mut hnsw = HnswIndex::new(DIMS, DistanceMetric::Cosine, 256);
        for (i, v) in vectors.iter().enumerate() {
            brute.insert(IssueId(i as u64), v.clone(), &version()).unwrap();
            hnsw.insert(IssueId(i as u64), v.clone(), &version()).unwrap();
        }
        // Effort far beyond corpus size: the beam visits everything, so
        // the approximate index must agree with the exact one.
        let exact = brute.query(&query, k, &version()).unwrap();
        let approx = hnsw.query(&query, k, &version()).unwrap();
        let exact_ids: Vec<IssueId> = exact.iter().map(|r| r.0).collect();
        let approx_ids: Vec<IssueId> = approx.iter().map(|r| r.0).collect();
        prop_assert_eq!(exact_ids, approx_ids);
    }

    #[test]
    fn churn_is_equivalent_to_clean_insert(
        first in vector_strategy(),
        second in vector_strategy(),
        query in vector_strategy(),
    ) {
        for (mut churned, mut clean) in [
            (
                Box::new(BruteForceIndex::new(DIMS, DistanceMetric::Cosine)) as Box<dyn VectorIndex>,
                Box::new(BruteForceIndex::new(DIMS, DistanceMetric::Cosine)) as Box<dyn VectorIndex>,
            ),
            (
                Box::new(HnswIndex::new(DIMS, DistanceMetric::Cosine, 256)) as Box<dyn VectorIndex>,
                Box::new(HnswIndex::new(DIMS, DistanceMetric::Cosine, 256)) as Box<dyn VectorIndex>,
            ),
        ] {
            churned.insert(IssueId(1), first.clone(), &version()).unwrap();
            churned.remove(IssueId(1), &version()).unwrap();
            churned.insert(IssueId(1), second.clone(), &version()).unwrap();

            clean.insert(IssueId(1), second.clone(), &version()).unwrap();

            prop_assert_eq!(
                churned.query(&query, 5, &version()).unwrap(),
                clean.query(&query, 5, &version()).unwrap()
            );
        }
    }
}
