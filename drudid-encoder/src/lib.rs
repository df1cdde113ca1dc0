//! # drudid-encoder
//!
//! Encoder Adapter for the drudid engine. Wraps an external
//! text-embedding model behind the `TextEncoder` trait and adds the
//! plumbing a production deployment needs: whitespace normalization,
//! input length enforcement, an L1 embedding cache, and a timeout bound
//! on the (potentially slow) model call.

pub mod cache;
pub mod engine;
pub mod normalize;
pub mod providers;

pub use engine::EncoderEngine;
pub use providers::{create_provider, HashingEncoder, OnnxEncoder};
