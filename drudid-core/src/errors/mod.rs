pub mod config_error;
pub mod encoding_error;
pub mod index_error;

pub use config_error::ConfigError;
pub use encoding_error::EncodingError;
pub use index_error::IndexError;

/// Top-level error for the drudid engine.
///
/// Every subsystem error converts into this via `#[from]`; callers that
/// need the precise failure match on the wrapped enum. Errors always
/// surface unmodified — the core never logs-and-swallows, and never turns
/// a failure into an empty-but-successful result.
#[derive(Debug, thiserror::Error)]
pub enum DrudidError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias used across the workspace.
pub type DrudidResult<T> = Result<T, DrudidError>;
