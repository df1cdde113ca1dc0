//! RetrievalEngine: orchestrates the per-request pipeline.
//!
//! encode → index query → score/filter, in that order, with no branching
//! back. Writes (`register`, `deregister`, `load_snapshot`) take the
//! write lock; queries share the read lock against a stable index state.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use drudid_core::config::EngineConfig;
use drudid_core::errors::DrudidResult;
use drudid_core::issue::{CandidateMatch, Issue, IssueId};
use drudid_core::traits::{TextEncoder, VectorIndex};
use drudid_encoder::EncoderEngine;

use crate::scoring::DuplicateScorer;
use crate::stage::RequestStage;

/// The duplicate-candidate retrieval engine.
///
/// Both collaborators are injected rather than looked up globally: the
/// encoder is shared (`Arc`) because its cache benefits every caller, and
/// the index is owned behind a reader-writer lock so concurrent queries
/// see either the pre- or post-mutation state, never a torn entry.
pub struct RetrievalEngine {
    encoder: Arc<EncoderEngine>,
    index: RwLock<Box<dyn VectorIndex>>,
    scorer: DuplicateScorer,
    max_results: usize,
}

impl RetrievalEngine {
    pub fn new(
        encoder: Arc<EncoderEngine>,
        index: Box<dyn VectorIndex>,
        config: &EngineConfig,
    ) -> Self {
        info!(
            model = %encoder.model_version(),
            dims = index.dimensions(),
            max_results = config.max_results,
            "retrieval engine initialized"
        );
        Self {
            encoder,
            index: RwLock::new(index),
            scorer: DuplicateScorer::new(config),
            max_results: config.max_results,
        }
    }

    /// Build encoder and index from configuration.
    pub fn from_config(config: &EngineConfig) -> DrudidResult<Self> {
        config.validate()?;
        let encoder = Arc::new(EncoderEngine::new(config)?);
        let index = drudid_index::create_index(config);
        Ok(Self::new(encoder, index, config))
    }

    /// Find ranked duplicate candidates for a (possibly unregistered)
    /// issue.
    ///
    /// Any stage failure surfaces that stage's error unmodified; no
    /// partial result is ever returned. An empty index yields an empty
    /// ranking, which is success, not an error.
    pub fn find_duplicates(&self, issue: &Issue) -> DrudidResult<Vec<CandidateMatch>> {
        match self.run_pipeline(issue) {
            Ok(ranked) => {
                debug!(
                    issue = %issue.id,
                    stage = %RequestStage::Returned,
                    results = ranked.len(),
                    "duplicate query complete"
                );
                Ok(ranked)
            }
            Err(e) => {
                debug!(issue = %issue.id, stage = %RequestStage::Failed, error = %e, "duplicate query failed");
                Err(e)
            }
        }
    }

    fn run_pipeline(&self, issue: &Issue) -> DrudidResult<Vec<CandidateMatch>> {
        debug!(issue = %issue.id, stage = %RequestStage::Received, "duplicate query");

        // Encoding happens outside any lock so slow inference never
        // blocks other readers or the write path.
        let vector = self.encoder.encode(&issue.text())?;
        debug!(issue = %issue.id, stage = %RequestStage::Encoded, "text encoded");

        // One extra beyond max_results so a self-match can be dropped
        // without starving the list.
        let raw = {
            let index = self.index.read();
            index.query(&vector, self.max_results + 1, self.encoder.model_version())?
        };
        debug!(
            issue = %issue.id,
            stage = %RequestStage::Queried,
            candidates = raw.len(),
            "index queried"
        );

        let ranked = self.scorer.rank(raw, Some(issue.id));
        debug!(
            issue = %issue.id,
            stage = %RequestStage::Scored,
            results = ranked.len(),
            "ranking complete"
        );
        Ok(ranked)
    }

    /// Index an issue's vector for future queries.
    ///
    /// Called after the duplicate decision is finalized externally;
    /// independent of any prior `find_duplicates` on the same issue.
    /// Re-registration fails with the index's `DuplicateId` — never a
    /// silent overwrite.
    pub fn register(&self, issue: &Issue) -> DrudidResult<()> {
        let vector = self.encoder.encode(&issue.text())?;
        let mut index = self.index.write();
        index.insert(issue.id, vector, self.encoder.model_version())?;
        debug!(issue = %issue.id, total = index.total_len(), "issue registered");
        Ok(())
    }

    /// Drop an issue's vector (edited upstream, or withdrawn).
    /// Re-registering afterwards picks up the new text.
    pub fn deregister(&self, issue_id: IssueId) -> DrudidResult<()> {
        let mut index = self.index.write();
        index.remove(issue_id, self.encoder.model_version())?;
        debug!(issue = %issue_id, total = index.total_len(), "issue deregistered");
        Ok(())
    }

    /// Serialize the index for the storage collaborator.
    pub fn export_snapshot(&self) -> DrudidResult<Vec<u8>> {
        Ok(self.index.read().export_snapshot()?)
    }

    /// Replace index contents from a snapshot. On failure the previous
    /// in-memory state is untouched.
    pub fn load_snapshot(&self, blob: &[u8]) -> DrudidResult<()> {
        let mut index = self.index.write();
        index.load_snapshot(blob)?;
        info!(entries = index.total_len(), "snapshot loaded");
        Ok(())
    }

    /// Live entries under the engine's model version.
    pub fn indexed_count(&self) -> usize {
        self.index.read().len(self.encoder.model_version())
    }
}
