//! EncoderEngine — the main entry point for drudid-encoder.
//!
//! Wraps a provider with whitespace normalization, input length
//! enforcement, an L1 embedding cache, and a timeout bound on the model
//! call. Implements `TextEncoder`, so it drops in anywhere a provider is
//! expected.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use drudid_core::config::{EncoderConfig, EngineConfig};
use drudid_core::errors::EncodingError;
use drudid_core::issue::ModelVersion;
use drudid_core::traits::TextEncoder;

use crate::cache::EmbeddingCache;
use crate::normalize::normalize_whitespace;
use crate::providers;

/// The main encoder engine.
pub struct EncoderEngine {
    provider: Arc<dyn TextEncoder>,
    cache: EmbeddingCache,
    max_input_chars: usize,
    timeout: Option<Duration>,
}

impl EncoderEngine {
    /// Build the engine with the provider named in config.
    pub fn new(config: &EngineConfig) -> Result<Self, EncodingError> {
        let provider = providers::create_provider(
            &config.encoder,
            config.dimensions,
            config.model_version.clone(),
        )?;
        Ok(Self::with_provider(Arc::from(provider), &config.encoder))
    }

    /// Wrap an existing provider. Used by tests to inject stubs.
    pub fn with_provider(provider: Arc<dyn TextEncoder>, encoder_config: &EncoderConfig) -> Self {
        let timeout = match encoder_config.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        info!(
            model = %provider.model_version(),
            dims = provider.dimensions(),
            timeout_ms = encoder_config.timeout_ms,
            "encoder engine initialized"
        );

        Self {
            provider,
            cache: EmbeddingCache::new(encoder_config.cache_size),
            max_input_chars: encoder_config.max_input_chars,
            timeout,
        }
    }

    fn encode_normalized(&self, normalized: String) -> Result<Vec<f32>, EncodingError> {
        let key = EmbeddingCache::key(self.provider.model_version(), &normalized);
        if let Some(vector) = self.cache.get(&key) {
            debug!(key = %key, "embedding cache hit");
            return Ok(vector);
        }

        let vector = self.call_provider(normalized)?;

        // A provider returning the wrong width would poison the index.
        if vector.len() != self.provider.dimensions() {
            return Err(EncodingError::InferenceFailed {
                reason: format!(
                    "provider returned {} dims, expected {}",
                    vector.len(),
                    self.provider.dimensions()
                ),
            });
        }

        self.cache.insert(key, vector.clone());
        Ok(vector)
    }

    /// Run the provider call, bounded by the configured timeout.
    ///
    /// The call runs on a worker thread; on timeout the caller unblocks
    /// with `Timeout` while the worker finishes in the background and its
    /// result is dropped. No automatic retry — that is the caller's call.
    fn call_provider(&self, text: String) -> Result<Vec<f32>, EncodingError> {
        let Some(timeout) = self.timeout else {
            return self.provider.encode(&text);
        };

        let provider = Arc::clone(&self.provider);
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(provider.encode(&text));
        });

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(_) => Err(EncodingError::Timeout {
                elapsed_ms: timeout.as_millis() as u64,
            }),
        }
    }
}

impl TextEncoder for EncoderEngine {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodingError> {
        let normalized = normalize_whitespace(text);
        if normalized.chars().count() > self.max_input_chars {
            return Err(EncodingError::InputTooLong {
                chars: normalized.chars().count(),
                max_chars: self.max_input_chars,
            });
        }
        self.encode_normalized(normalized)
    }

    fn dimensions(&self) -> usize {
        self.provider.dimensions()
    }

    fn model_version(&self) -> &ModelVersion {
        self.provider.model_version()
    }

    fn is_available(&self) -> bool {
        self.provider.is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::providers::HashingEncoder;

    fn engine_with(encoder_config: EncoderConfig) -> EncoderEngine {
        let provider = Arc::new(HashingEncoder::new(128, ModelVersion::new("hashing-v1")));
        EncoderEngine::with_provider(provider, &encoder_config)
    }

    fn default_engine() -> EncoderEngine {
        engine_with(EncoderConfig::default())
    }

    /// Stub provider that stalls longer than any test timeout.
    struct StallingEncoder {
        version: ModelVersion,
    }

    impl TextEncoder for StallingEncoder {
        fn encode(&self, _text: &str) -> Result<Vec<f32>, EncodingError> {
            thread::sleep(Duration::from_secs(5));
            Ok(vec![0.0; 8])
        }

        fn dimensions(&self) -> usize {
            8
        }

        fn model_version(&self) -> &ModelVersion {
            &self.version
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn whitespace_variants_encode_identically() {
        let engine = default_engine();
        let a = engine.encode("crash  on\tsave").unwrap();
        let b = engine.encode("crash on save").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn oversized_input_is_rejected_not_truncated() {
        let engine = engine_with(EncoderConfig {
            max_input_chars: 16,
            ..EncoderConfig::default()
        });
        let err = engine.encode(&"x".repeat(64)).unwrap_err();
        assert!(matches!(
            err,
            EncodingError::InputTooLong {
                chars: 64,
                max_chars: 16
            }
        ));
    }

    #[test]
    fn repeated_encode_serves_from_cache() {
        let engine = default_engine();
        let a = engine.encode("memory leak in cron").unwrap();
        let b = engine.encode("memory leak in cron").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn batch_preserves_order_and_matches_individual() {
        let engine = default_engine();
        let texts = vec![
            "form validation broken".to_string(),
            "emails not sending".to_string(),
            "timezone off by one".to_string(),
        ];
        let batch = engine.encode_batch(&texts).unwrap();
        assert_eq!(batch.len(), 3);
        for (i, text) in texts.iter().enumerate() {
            assert_eq!(batch[i], engine.encode(text).unwrap());
        }
    }

    #[test]
    fn stalled_provider_times_out() {
        let provider = Arc::new(StallingEncoder {
            version: ModelVersion::new("stall-v1"),
        });
        let engine = EncoderEngine::with_provider(
            provider,
            &EncoderConfig {
                timeout_ms: 50,
                ..EncoderConfig::default()
            },
        );
        let err = engine.encode("anything").unwrap_err();
        assert!(matches!(err, EncodingError::Timeout { elapsed_ms: 50 }));
    }

    #[test]
    fn zero_timeout_means_unbounded() {
        let engine = engine_with(EncoderConfig {
            timeout_ms: 0,
            ..EncoderConfig::default()
        });
        assert!(engine.encode("quick encode").is_ok());
    }
}
