//! Snapshot wire format shared by all index strategies.
//!
//! A snapshot is a serialized sequence of live entries plus the header
//! needed to refuse incompatible loads: format version, dimensions, and
//! metric. Sequence numbers travel with the entries so distance
//! tie-breaks survive a round-trip.

use serde::{Deserialize, Serialize};

use drudid_core::constants::SNAPSHOT_FORMAT_VERSION;
use drudid_core::errors::IndexError;
use drudid_core::metric::DistanceMetric;

use crate::entry::IndexEntry;

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub format_version: u32,
    pub dimensions: usize,
    pub metric: DistanceMetric,
    pub entries: Vec<IndexEntry>,
}

fn corrupt(reason: impl Into<String>) -> IndexError {
    IndexError::CorruptSnapshot {
        reason: reason.into(),
    }
}

/// Serialize live entries, ordered by sequence number.
pub fn encode(
    dimensions: usize,
    metric: DistanceMetric,
    mut entries: Vec<IndexEntry>,
) -> Result<Vec<u8>, IndexError> {
    entries.sort_by_key(|e| e.seq);
    let snapshot = IndexSnapshot {
        format_version: SNAPSHOT_FORMAT_VERSION,
        dimensions,
        metric,
        entries,
    };
    serde_json::to_vec(&snapshot).map_err(|e| corrupt(format!("serialization failed: {e}")))
}

/// Parse and validate a snapshot against the loading index's shape.
///
/// Returns entries sorted by sequence. Any structural problem —
/// unparseable blob, format/dimension/metric mismatch, duplicate keys or
/// sequences — is `CorruptSnapshot`; the caller leaves its state alone.
pub fn decode(
    blob: &[u8],
    expected_dimensions: usize,
    expected_metric: DistanceMetric,
) -> Result<Vec<IndexEntry>, IndexError> {
    let snapshot: IndexSnapshot =
        serde_json::from_slice(blob).map_err(|e| corrupt(format!("unparseable blob: {e}")))?;

    if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(corrupt(format!(
            "format version {} not supported (expected {})",
            snapshot.format_version, SNAPSHOT_FORMAT_VERSION
        )));
    }
    if snapshot.dimensions != expected_dimensions {
        return Err(corrupt(format!(
            "snapshot has {} dimensions, index is configured for {}",
            snapshot.dimensions, expected_dimensions
        )));
    }
    if snapshot.metric != expected_metric {
        return Err(corrupt(format!(
            "snapshot metric {:?} does not match configured {:?}",
            snapshot.metric, expected_metric
        )));
    }

    let mut entries = snapshot.entries;
    entries.sort_by_key(|e| e.seq);

    let mut seen_keys = std::collections::HashSet::new();
    let mut last_seq = None;
    for entry in &entries {
        if entry.vector.len() != expected_dimensions {
            return Err(corrupt(format!(
                "entry {} has {} dimensions, expected {}",
                entry.issue_id,
                entry.vector.len(),
                expected_dimensions
            )));
        }
        if !seen_keys.insert(entry.key()) {
            return Err(corrupt(format!(
                "duplicate entry for {} under model {}",
                entry.issue_id, entry.model_version
            )));
        }
        if last_seq == Some(entry.seq) {
            return Err(corrupt(format!("duplicate sequence number {}", entry.seq)));
        }
        last_seq = Some(entry.seq);
    }

    Ok(entries)
}
