//! Ingestion lifecycle events.
//!
//! Published by the ingestion controller so the rendering layer can observe
//! state transitions without being called into by the core.

use serde::{Deserialize, Serialize};

use crate::repo::RepoRef;

/// A repository ingestion state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IngestEvent {
    /// The repository entered the in-flight set.
    Started { repo: RepoRef },

    /// Ingestion succeeded; the repository is ready for chat.
    Completed { repo: RepoRef },

    /// Ingestion failed; the repository is not in the ready set.
    Failed { repo: RepoRef, reason: String },
}

impl IngestEvent {
    /// The repository this event concerns.
    pub fn repo(&self) -> &RepoRef {
        match self {
            IngestEvent::Started { repo }
            | IngestEvent::Completed { repo }
            | IngestEvent::Failed { repo, .. } => repo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serde_tagged() {
        let event = IngestEvent::Completed {
            repo: RepoRef::new("foo"),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"completed","repo":"foo"}"#);
    }

    #[test]
    fn test_event_repo_accessor() {
        let repo = RepoRef::new("bar");
        let event = IngestEvent::Failed {
            repo: repo.clone(),
            reason: "clone failed".to_string(),
        };
        assert_eq!(event.repo(), &repo);
    }
}
