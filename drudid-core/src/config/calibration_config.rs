use serde::{Deserialize, Serialize};

/// Distance → confidence calibration function.
///
/// Calibration constants are tuned empirically against labeled duplicate
/// pairs, so they are configuration rather than code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "function", rename_all = "snake_case")]
pub enum CalibrationConfig {
    /// Confidence 1.0 at distance 0, falling linearly to 0.0 at `zero_at`.
    ClampedLinear { zero_at: f64 },
    /// Logistic curve: 1 / (1 + e^(steepness · (distance − midpoint))).
    /// `steepness` must be positive for the curve to decrease.
    Logistic { midpoint: f64, steepness: f64 },
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self::ClampedLinear { zero_at: 1.0 }
    }
}
