//! Distance → confidence calibration.
//!
//! Every curve here is monotone non-increasing in distance, which is what
//! lets the scorer keep the index's ascending-distance order as
//! descending-confidence order without re-sorting.

use drudid_core::config::CalibrationConfig;
use drudid_core::issue::Confidence;

/// A fitted calibration curve. Constants come from configuration — tuned
/// empirically against labeled duplicate pairs, not hardcoded.
#[derive(Debug, Clone, Copy)]
pub enum Calibration {
    /// Confidence 1.0 at distance 0, linear down to 0.0 at `zero_at`.
    ClampedLinear { zero_at: f64 },
    /// 1 / (1 + e^(steepness · (distance − midpoint))).
    Logistic { midpoint: f64, steepness: f64 },
}

impl Calibration {
    pub fn score(self, distance: f32) -> Confidence {
        let d = distance as f64;
        let raw = match self {
            Self::ClampedLinear { zero_at } => {
                if zero_at <= 0.0 {
                    // Degenerate curve: everything but an exact hit is 0.
                    if d <= 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    1.0 - d / zero_at
                }
            }
            Self::Logistic {
                midpoint,
                steepness,
            } => 1.0 / (1.0 + (steepness * (d - midpoint)).exp()),
        };
        Confidence::new(raw)
    }
}

impl From<&CalibrationConfig> for Calibration {
    fn from(config: &CalibrationConfig) -> Self {
        match *config {
            CalibrationConfig::ClampedLinear { zero_at } => Self::ClampedLinear { zero_at },
            CalibrationConfig::Logistic {
                midpoint,
                steepness,
            } => Self::Logistic {
                midpoint,
                steepness,
            },
        }
    }
}
