use crate::errors::EncodingError;
use crate::issue::ModelVersion;

/// Text → fixed-dimension embedding vector.
///
/// Implementations must be deterministic for a fixed model version and
/// identical input text, and must never mutate any index state.
pub trait TextEncoder: Send + Sync {
    /// Encode a single text.
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodingError>;

    /// Encode a batch, preserving input order.
    ///
    /// Output must be element-identical to calling `encode` per item —
    /// no cross-item interference.
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncodingError> {
        texts.iter().map(|t| self.encode(t)).collect()
    }

    /// Dimensionality of produced vectors.
    fn dimensions(&self) -> usize;

    /// The model revision this encoder produces vectors for.
    fn model_version(&self) -> &ModelVersion;

    /// Whether the underlying model is currently usable.
    fn is_available(&self) -> bool;
}
