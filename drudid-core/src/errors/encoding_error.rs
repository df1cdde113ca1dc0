/// Encoder Adapter errors.
///
/// The adapter never retries on its own — retrying an overloaded external
/// model can worsen backpressure, so retry policy stays with the caller.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("encoder model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    #[error("input of {chars} chars exceeds encoder maximum of {max_chars}")]
    InputTooLong { chars: usize, max_chars: usize },

    #[error("inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("encoder call exceeded {elapsed_ms}ms timeout")]
    Timeout { elapsed_ms: u64 },
}
