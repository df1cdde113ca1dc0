//! # drudid-index
//!
//! Vector index strategies for the drudid engine. Two implementations of
//! the `VectorIndex` trait share one ordering contract and one snapshot
//! format:
//!
//! - [`BruteForceIndex`] — exact linear scan, the reference semantics.
//! - [`HnswIndex`] — approximate HNSW graph for production scale.
//!
//! Determinism rule: every entry carries a monotonically increasing
//! insertion sequence number; equal distances rank earlier sequences
//! first, and snapshots preserve sequences so a reload never reorders
//! results.

pub mod brute;
pub mod entry;
pub mod hnsw;
pub mod snapshot;

pub use brute::BruteForceIndex;
pub use entry::IndexEntry;
pub use hnsw::HnswIndex;
pub use snapshot::IndexSnapshot;

use drudid_core::config::{EngineConfig, IndexStrategy};
use drudid_core::traits::VectorIndex;

/// Build the index strategy named in config.
pub fn create_index(config: &EngineConfig) -> Box<dyn VectorIndex> {
    match config.index_strategy {
        IndexStrategy::BruteForce => Box::new(BruteForceIndex::new(
            config.dimensions,
            config.distance_metric,
        )),
        IndexStrategy::Hnsw => Box::new(HnswIndex::new(
            config.dimensions,
            config.distance_metric,
            config.ann_effort,
        )),
    }
}
