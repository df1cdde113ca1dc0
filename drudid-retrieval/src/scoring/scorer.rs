//! Duplicate Scorer: raw distances → ranked, thresholded candidates.

use drudid_core::config::EngineConfig;
use drudid_core::issue::{CandidateMatch, IssueId};

use super::Calibration;

/// Converts index query output into the final ranked candidate list.
///
/// The input arrives ascending by distance with the index's insertion-order
/// tie-break already applied; the calibration curve is monotone, so this
/// stage only maps, filters, and truncates — it never re-sorts, which is
/// what keeps ranking stable.
#[derive(Debug, Clone)]
pub struct DuplicateScorer {
    calibration: Calibration,
    min_confidence: f64,
    max_results: usize,
    include_self_match: bool,
}

impl DuplicateScorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            calibration: Calibration::from(&config.calibration),
            min_confidence: config.min_confidence,
            max_results: config.max_results,
            include_self_match: config.include_self_match,
        }
    }

    /// Map a single distance to a confidence.
    pub fn score(&self, distance: f32) -> drudid_core::issue::Confidence {
        self.calibration.score(distance)
    }

    /// Score, threshold, truncate, and rank raw index results.
    ///
    /// `self_id` is the querying issue's own id; if its entry is already
    /// in the index (re-scoring after insertion) it is dropped before
    /// ranking, unless configured otherwise for index-health checks.
    pub fn rank(
        &self,
        raw: Vec<(IssueId, f32)>,
        self_id: Option<IssueId>,
    ) -> Vec<CandidateMatch> {
        raw.into_iter()
            .filter(|(id, _)| {
                self.include_self_match || self_id.map(|own| own != *id).unwrap_or(true)
            })
            .map(|(issue_id, distance)| (issue_id, distance, self.calibration.score(distance)))
            .filter(|(_, _, confidence)| confidence.value() >= self.min_confidence)
            .take(self.max_results)
            .enumerate()
            .map(|(i, (issue_id, distance, confidence))| CandidateMatch {
                issue_id,
                distance,
                confidence,
                rank: i + 1,
            })
            .collect()
    }
}
