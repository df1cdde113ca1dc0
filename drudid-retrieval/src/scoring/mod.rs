pub mod calibration;
pub mod scorer;

pub use calibration::Calibration;
pub use scorer::DuplicateScorer;
