//! In-memory embedding cache using moka.
//!
//! Keys are blake3 hashes over (model version, normalized text), so a
//! model upgrade never serves vectors from the old revision.

use std::time::Duration;

use moka::sync::Cache;

use drudid_core::issue::ModelVersion;

/// L1 embedding cache.
pub struct EmbeddingCache {
    cache: Cache<String, Vec<f32>>,
}

impl EmbeddingCache {
    /// Create a cache with the given max entry count.
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(Duration::from_secs(3600))
            .build();

        Self { cache }
    }

    /// Cache key for a normalized text under a model version.
    pub fn key(model_version: &ModelVersion, normalized_text: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(model_version.as_str().as_bytes());
        hasher.update(b"\x00");
        hasher.update(normalized_text.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        self.cache.get(key)
    }

    pub fn insert(&self, key: String, embedding: Vec<f32>) {
        self.cache.insert(key, embedding);
    }
}
