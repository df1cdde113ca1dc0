use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Externally assigned, stable issue identifier (the tracker's node id).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct IssueId(pub u64);

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for IssueId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Identifies the encoder model revision that produced a vector.
///
/// Vectors from different model versions are never compared against each
/// other; the index keeps them invisible to one another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelVersion(pub String);

impl ModelVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelVersion {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// An issue report as supplied by the ingestion collaborator.
///
/// Text is immutable once stored; an edit upstream is modeled as
/// deregister + re-register with the new text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    pub body: String,
    pub created: DateTime<Utc>,
    /// Confirmed duplicate target, set only by external judgment
    /// (human or automated review) — never by the scorer.
    #[serde(default)]
    pub duplicate_of: Option<IssueId>,
}

impl Issue {
    pub fn new(
        id: impl Into<IssueId>,
        title: impl Into<String>,
        body: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            created,
            duplicate_of: None,
        }
    }

    /// The text fed to the encoder: title and body joined.
    pub fn text(&self) -> String {
        if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{}\n{}", self.title, self.body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_text_joins_title_and_body() {
        let issue = Issue::new(42u64, "Crash on save", "Steps to reproduce", Utc::now());
        assert_eq!(issue.text(), "Crash on save\nSteps to reproduce");
    }

    #[test]
    fn issue_text_with_empty_body_is_title_only() {
        let issue = Issue::new(42u64, "Crash on save", "", Utc::now());
        assert_eq!(issue.text(), "Crash on save");
    }

    #[test]
    fn issue_id_displays_with_hash_prefix() {
        assert_eq!(IssueId(3012).to_string(), "#3012");
    }

    #[test]
    fn model_version_round_trips_through_serde() {
        let v = ModelVersion::new("minilm-l6-v2");
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"minilm-l6-v2\"");
        let back: ModelVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
