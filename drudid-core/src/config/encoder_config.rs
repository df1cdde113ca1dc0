use serde::{Deserialize, Serialize};

use crate::constants;

/// Which encoder provider to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderProvider {
    /// Deterministic hashed bag-of-words vectors. Always available,
    /// no model file needed.
    #[default]
    Hashing,
    /// ONNX Runtime inference from a local model file.
    Onnx,
}

/// Encoder Adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub provider: EncoderProvider,
    /// Path to the ONNX model file. Ignored by the hashing provider.
    pub model_path: Option<String>,
    /// Inputs longer than this fail with `InputTooLong` — the adapter
    /// never silently truncates.
    pub max_input_chars: usize,
    /// Upper bound on a single encoder call, in milliseconds.
    /// Zero disables the bound.
    pub timeout_ms: u64,
    /// Embedding cache capacity, in entries.
    pub cache_size: u64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            provider: EncoderProvider::Hashing,
            model_path: None,
            max_input_chars: constants::DEFAULT_MAX_INPUT_CHARS,
            timeout_ms: constants::DEFAULT_ENCODER_TIMEOUT_MS,
            cache_size: constants::DEFAULT_CACHE_SIZE,
        }
    }
}
