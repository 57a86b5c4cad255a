//! Repository identity and ingestion lifecycle types.
//!
//! A [`RepoRef`] names one repository on the remote service. It is derived
//! from a clone URL and immutable once created. [`IngestState`] tracks where
//! that repository sits in the available -> loading -> ready lifecycle.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Identifier for a repository, derived from its clone URL.
///
/// Two URLs differing only in path prefix or a trailing `.git` suffix
/// normalize to the same ref (e.g. `https://github.com/org/foo.git` and
/// `git@github.com:org/foo` both yield `foo`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoRef(String);

impl RepoRef {
    /// Derive a ref from a clone URL: the final path segment, with a
    /// trailing `.git` suffix stripped if present.
    pub fn from_url(repo_url: &str) -> Self {
        let name = repo_url.rsplit('/').next().unwrap_or(repo_url);
        let name = name.strip_suffix(".git").unwrap_or(name);
        Self(name.to_string())
    }

    /// Wrap an already-normalized repository name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The repository name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RepoRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Lifecycle state of a repository on the remote service.
///
/// Exactly one state per [`RepoRef`] at any time. Refs in `Loading` form the
/// in-flight set used to suppress duplicate ingestion requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum IngestState {
    /// Known but not ingested; eligible for cloning.
    Available,
    /// An ingestion request is in flight.
    Loading,
    /// Ingestion complete; the repository may be selected for chat.
    Ready,
    /// The last ingestion attempt failed. Eligible for manual re-clone.
    Failed { reason: String },
}

impl IngestState {
    /// Whether the repository may be selected for chat.
    pub fn is_ready(&self) -> bool {
        matches!(self, IngestState::Ready)
    }

    /// Whether the repository is in the in-flight set.
    pub fn is_loading(&self) -> bool {
        matches!(self, IngestState::Loading)
    }
}

impl Default for IngestState {
    fn default() -> Self {
        IngestState::Available
    }
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestState::Available => write!(f, "available"),
            IngestState::Loading => write!(f, "loading"),
            IngestState::Ready => write!(f, "ready"),
            IngestState::Failed { .. } => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_from_https_url() {
        let repo = RepoRef::from_url("https://github.com/org/foo.git");
        assert_eq!(repo.as_str(), "foo");
    }

    #[test]
    fn test_ref_from_url_without_suffix() {
        let repo = RepoRef::from_url("https://github.com/org/bar");
        assert_eq!(repo.as_str(), "bar");
    }

    #[test]
    fn test_ref_normalization_is_idempotent() {
        // URLs differing only in path prefix or trailing .git yield the same ref.
        let variants = [
            "https://github.com/org/foo.git",
            "https://github.com/other-org/foo",
            "foo.git",
            "foo",
        ];
        for url in variants {
            assert_eq!(RepoRef::from_url(url), RepoRef::new("foo"), "from {url}");
        }
    }

    #[test]
    fn test_ref_strips_only_trailing_git() {
        // `.git` inside the name is not a suffix marker.
        let repo = RepoRef::from_url("https://github.com/org/my.github.io");
        assert_eq!(repo.as_str(), "my.github.io");
    }

    #[test]
    fn test_ref_serde_transparent() {
        let repo = RepoRef::new("foo");
        let json = serde_json::to_string(&repo).unwrap();
        assert_eq!(json, "\"foo\"");
        let parsed: RepoRef = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, repo);
    }

    #[test]
    fn test_ingest_state_default() {
        assert_eq!(IngestState::default(), IngestState::Available);
    }

    #[test]
    fn test_ingest_state_predicates() {
        assert!(IngestState::Ready.is_ready());
        assert!(!IngestState::Ready.is_loading());
        assert!(IngestState::Loading.is_loading());
        assert!(!IngestState::Available.is_ready());
        let failed = IngestState::Failed {
            reason: "clone failed".to_string(),
        };
        assert!(!failed.is_ready());
        assert!(!failed.is_loading());
    }

    #[test]
    fn test_ingest_state_display() {
        assert_eq!(IngestState::Loading.to_string(), "loading");
        let failed = IngestState::Failed {
            reason: "timeout".to_string(),
        };
        assert_eq!(failed.to_string(), "failed");
    }
}
