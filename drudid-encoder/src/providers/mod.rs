pub mod hashing;
pub mod onnx;

pub use hashing::HashingEncoder;
pub use onnx::OnnxEncoder;

use drudid_core::config::{EncoderConfig, EncoderProvider};
use drudid_core::errors::EncodingError;
use drudid_core::issue::ModelVersion;
use drudid_core::traits::TextEncoder;

/// Build the provider named in config.
///
/// # Errors
/// `ModelUnavailable` if the ONNX provider is requested without a model
/// path, or the model cannot be loaded.
pub fn create_provider(
    config: &EncoderConfig,
    dimensions: usize,
    model_version: ModelVersion,
) -> Result<Box<dyn TextEncoder>, EncodingError> {
    match config.provider {
        EncoderProvider::Hashing => Ok(Box::new(HashingEncoder::new(dimensions, model_version))),
        EncoderProvider::Onnx => {
            let path = config
                .model_path
                .as_deref()
                .ok_or_else(|| EncodingError::ModelUnavailable {
                    reason: "onnx provider requires encoder.model_path".to_string(),
                })?;
            let encoder = OnnxEncoder::load(path, dimensions, model_version)?;
            Ok(Box::new(encoder))
        }
    }
}
