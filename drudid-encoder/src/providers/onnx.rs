//! ONNX Runtime embedding provider.
//!
//! Loads a sentence-embedding model via the `ort` crate (v2), runs
//! inference with mean pooling, and L2-normalizes the output so cosine
//! distance is well behaved.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tracing::debug;

use drudid_core::errors::EncodingError;
use drudid_core::issue::ModelVersion;
use drudid_core::traits::TextEncoder;

/// ONNX-based embedding provider.
///
/// `Session::run` needs `&mut self`, so the session sits behind a Mutex
/// to satisfy the `&self` trait surface.
pub struct OnnxEncoder {
    session: Mutex<Session>,
    dimensions: usize,
    model_version: ModelVersion,
}

// Safety: Session is Send but not Sync by default. The Mutex provides Sync.
unsafe impl Sync for OnnxEncoder {}

fn inference_failed(reason: impl Into<String>) -> EncodingError {
    EncodingError::InferenceFailed {
        reason: reason.into(),
    }
}

impl OnnxEncoder {
    /// Load an ONNX model from the given path.
    ///
    /// # Errors
    /// `ModelUnavailable` if the file is missing or the session cannot be
    /// built.
    pub fn load(
        model_path: &str,
        dimensions: usize,
        model_version: ModelVersion,
    ) -> Result<Self, EncodingError> {
        if !Path::new(model_path).exists() {
            return Err(EncodingError::ModelUnavailable {
                reason: format!("model file not found: {model_path}"),
            });
        }

        let session = Session::builder()
            .map_err(|e| EncodingError::ModelUnavailable {
                reason: format!("failed to create session builder: {e}"),
            })?
            .with_intra_threads(2)
            .map_err(|e| EncodingError::ModelUnavailable {
                reason: format!("failed to configure session: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| EncodingError::ModelUnavailable {
                reason: format!("failed to load {model_path}: {e}"),
            })?;

        debug!(model = %model_version, dims = dimensions, "ONNX model loaded");

        Ok(Self {
            session: Mutex::new(session),
            dimensions,
            model_version,
        })
    }

    fn infer(&self, text: &str) -> Result<Vec<f32>, EncodingError> {
        let token_ids = Self::hash_tokenize(text);
        let seq_len = token_ids.len();

        let input_ids: Vec<i64> = token_ids.iter().map(|&id| id as i64).collect();
        let attention_mask = vec![1i64; seq_len];

        let ids_tensor = Tensor::from_array((vec![1i64, seq_len as i64], input_ids))
            .map_err(|e| inference_failed(format!("tensor creation error: {e}")))?;
        let mask_tensor = Tensor::from_array((vec![1i64, seq_len as i64], attention_mask))
            .map_err(|e| inference_failed(format!("tensor creation error: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| inference_failed(format!("session lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs![ids_tensor, mask_tensor])
            .map_err(|e| inference_failed(e.to_string()))?;

        let (_name, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| inference_failed("no output tensor"))?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| inference_failed(format!("tensor extraction failed: {e}")))?;

        let dims: Vec<i64> = shape.iter().copied().collect();
        let mut embedding = Self::mean_pool(&dims, data)?;

        // L2 normalize.
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding.resize(self.dimensions, 0.0);
        Ok(embedding)
    }

    /// Pool the model output down to a single vector.
    fn mean_pool(shape: &[i64], data: &[f32]) -> Result<Vec<f32>, EncodingError> {
        match shape.len() {
            // [batch=1, seq, dims] — average across the sequence.
            3 => {
                let seq = shape[1] as usize;
                let dims = shape[2] as usize;
                let mut pooled = vec![0.0f32; dims];
                for s in 0..seq {
                    for d in 0..dims {
                        pooled[d] += data[s * dims + d];
                    }
                }
                for v in &mut pooled {
                    *v /= seq as f32;
                }
                Ok(pooled)
            }
            // [batch=1, dims] — already pooled by the model.
            2 => {
                let dims = shape[1] as usize;
                Ok(data[..dims].to_vec())
            }
            _ => Err(inference_failed(format!(
                "unexpected output shape: {shape:?}"
            ))),
        }
    }

    /// Hash words into a fixed vocab range, bracketed by [CLS]/[SEP].
    fn hash_tokenize(text: &str) -> Vec<u32> {
        if text.is_empty() {
            return vec![101, 102];
        }
        let mut ids = vec![101u32];
        for word in text.split(|c: char| !c.is_alphanumeric() && c != '_') {
            if word.is_empty() {
                continue;
            }
            let mut h: u32 = 0x811c9dc5;
            for b in word.to_lowercase().as_bytes() {
                h ^= *b as u32;
                h = h.wrapping_mul(0x01000193);
            }
            ids.push(1 + (h % 29999));
        }
        ids.push(102);
        ids
    }
}

impl TextEncoder for OnnxEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodingError> {
        self.infer(text)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_version(&self) -> &ModelVersion {
        &self.model_version
    }

    fn is_available(&self) -> bool {
        !self.session.is_poisoned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_file_is_unavailable() {
        let result = OnnxEncoder::load(
            "/nonexistent/model.onnx",
            384,
            ModelVersion::new("minilm-l6-v2"),
        );
        assert!(matches!(
            result.err(),
            Some(EncodingError::ModelUnavailable { .. })
        ));
    }

    #[test]
    fn hash_tokenize_brackets_with_special_ids() {
        let ids = OnnxEncoder::hash_tokenize("hello world");
        assert_eq!(ids.first(), Some(&101));
        assert_eq!(ids.last(), Some(&102));
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn hash_tokenize_empty_text() {
        assert_eq!(OnnxEncoder::hash_tokenize(""), vec![101, 102]);
    }

    #[test]
    fn mean_pool_averages_sequence_dimension() {
        let data = [1.0, 2.0, 3.0, 4.0]; // [1, 2, 2]
        let pooled = OnnxEncoder::mean_pool(&[1, 2, 2], &data).unwrap();
        assert_eq!(pooled, vec![2.0, 3.0]);
    }

    #[test]
    fn mean_pool_rejects_unexpected_rank() {
        let err = OnnxEncoder::mean_pool(&[4], &[0.0; 4]).unwrap_err();
        assert!(matches!(err, EncodingError::InferenceFailed { .. }));
    }
}
