pub mod calibration_config;
pub mod encoder_config;

pub use calibration_config::CalibrationConfig;
pub use encoder_config::{EncoderConfig, EncoderProvider};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::ConfigError;
use crate::issue::ModelVersion;
use crate::metric::DistanceMetric;

/// Which vector index strategy to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStrategy {
    /// Exact linear scan. Reference semantics; fine for small corpora.
    BruteForce,
    /// Approximate HNSW graph for production scale.
    #[default]
    Hnsw,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Encoder model revision tag. One index instance holds vectors of
    /// one version per query; mixing versions is an integrity error.
    pub model_version: ModelVersion,
    pub distance_metric: DistanceMetric,
    pub index_strategy: IndexStrategy,
    /// Candidates scoring below this are not surfaced.
    pub min_confidence: f64,
    /// Upper bound on surfaced candidates per query.
    pub max_results: usize,
    /// ANN tuning knob (HNSW ef). Higher trades speed for recall;
    /// recall degrades gracefully as this shrinks.
    pub ann_effort: usize,
    /// Embedding dimensionality, fixed for the index's lifetime.
    pub dimensions: usize,
    /// Keep a query issue's own entry in its results. Off outside
    /// index-health tests.
    pub include_self_match: bool,
    pub encoder: EncoderConfig,
    pub calibration: CalibrationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_version: ModelVersion::new("hashing-v1"),
            distance_metric: DistanceMetric::Cosine,
            index_strategy: IndexStrategy::default(),
            min_confidence: constants::DEFAULT_MIN_CONFIDENCE,
            max_results: constants::DEFAULT_MAX_RESULTS,
            ann_effort: constants::DEFAULT_ANN_EFFORT,
            dimensions: constants::DEFAULT_DIMENSIONS,
            include_self_match: false,
            encoder: EncoderConfig::default(),
            calibration: CalibrationConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::ParseFailed {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::InvalidValue {
                field: "min_confidence",
                reason: format!("{} is outside [0, 1]", self.min_confidence),
            });
        }
        if self.max_results == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_results",
                reason: "must be positive".to_string(),
            });
        }
        if self.dimensions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dimensions",
                reason: "must be positive".to_string(),
            });
        }
        if self.ann_effort == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ann_effort",
                reason: "must be positive".to_string(),
            });
        }
        if let CalibrationConfig::Logistic { steepness, .. } = self.calibration {
            if steepness <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: "calibration.steepness",
                    reason: "must be positive for a decreasing curve".to_string(),
                });
            }
        }
        Ok(())
    }
}
