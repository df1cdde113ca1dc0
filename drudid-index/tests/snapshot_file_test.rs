//! Snapshot persistence through the filesystem, the way the storage sync
//! collaborator consumes it: export to a file, read it back, load.

use std::fs;

use drudid_core::issue::{IssueId, ModelVersion};
use drudid_core::metric::DistanceMetric;
use drudid_core::traits::VectorIndex;
use drudid_index::{BruteForceIndex, HnswIndex};

fn version() -> ModelVersion {
    ModelVersion::new("v1")
}

fn vector_for(i: u64) -> Vec<f32> {
    vec![(i as f32 * 0.31).sin(), (i as f32 * 0.67).cos(), 1.0]
}

fn populate(index: &mut dyn VectorIndex) {
    for i in 0..25 {
        index.insert(IssueId(i), vector_for(i), &version()).unwrap();
    }
}

#[test]
fn file_round_trip_across_strategies() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.snapshot");

    let mut original = BruteForceIndex::new(3, DistanceMetric::Cosine);
    populate(&mut original);

    fs::write(&path, original.export_snapshot().unwrap()).unwrap();
    let blob = fs::read(&path).unwrap();

    // The format is strategy-independent: a snapshot exported from the
    // exact index restores into the approximate one and vice versa.
    let mut hnsw = HnswIndex::new(3, DistanceMetric::Cosine, 128);
    hnsw.load_snapshot(&blob).unwrap();

    let q = vector_for(13);
    assert_eq!(
        original.query(&q, 10, &version()).unwrap(),
        hnsw.query(&q, 10, &version()).unwrap()
    );
}

#[test]
fn truncated_file_is_rejected_as_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.snapshot");

    let mut index = BruteForceIndex::new(3, DistanceMetric::Cosine);
    populate(&mut index);
    let blob = index.export_snapshot().unwrap();
    fs::write(&path, &blob[..blob.len() / 2]).unwrap();

    let mangled = fs::read(&path).unwrap();
    let mut fresh = BruteForceIndex::new(3, DistanceMetric::Cosine);
    assert!(fresh.load_snapshot(&mangled).is_err());
    assert_eq!(fresh.total_len(), 0);
}
