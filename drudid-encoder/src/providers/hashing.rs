//! Signed feature-hashing encoder.
//!
//! Produces deterministic dense vectors from issue text with no model
//! file: terms hash into fixed-dimension buckets with a sign bit drawn
//! from a second hash, which cancels collision bias. Not as semantically
//! rich as neural embeddings, but always available — the default
//! provider for tests and air-gapped deployments.

use std::collections::HashMap;

use drudid_core::errors::EncodingError;
use drudid_core::issue::ModelVersion;
use drudid_core::traits::TextEncoder;

/// Hashed bag-of-words embedding provider.
pub struct HashingEncoder {
    dimensions: usize,
    model_version: ModelVersion,
}

impl HashingEncoder {
    pub fn new(dimensions: usize, model_version: ModelVersion) -> Self {
        Self {
            dimensions,
            model_version,
        }
    }

    /// FNV-1a over a term with a salt byte, so the bucket hash and the
    /// sign hash are independent.
    fn hash_term(term: &str, salt: u8) -> u64 {
        let mut h: u64 = 0xcbf29ce484222325;
        h ^= salt as u64;
        h = h.wrapping_mul(0x100000001b3);
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        h
    }

    /// Lowercase alphanumeric terms, two chars or longer.
    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.len() >= 2)
            .map(|s| s.to_lowercase())
            .collect()
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let tokens = Self::tokenize(text);
        let mut vec = vec![0.0f32; self.dimensions];
        if tokens.is_empty() {
            return vec;
        }

        let mut tf: HashMap<&str, f32> = HashMap::new();
        for tok in &tokens {
            *tf.entry(tok.as_str()).or_default() += 1.0;
        }

        for (term, count) in &tf {
            // Sublinear term frequency; longer terms carry more signal.
            let weight = (1.0 + count.ln()) * (1.0 + (term.len() as f32).ln());
            let bucket = (Self::hash_term(term, 0x00) as usize) % self.dimensions;
            let sign = if Self::hash_term(term, 0x5a) & 1 == 0 {
                1.0
            } else {
                -1.0
            };
            vec[bucket] += sign * weight;
        }

        // L2 normalize so cosine distance behaves.
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }

        vec
    }
}

impl TextEncoder for HashingEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodingError> {
        Ok(self.vectorize(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_version(&self) -> &ModelVersion {
        &self.model_version
    }

    fn is_available(&self) -> bool {
        true
    }
}
