//! Per-repository chat session store.
//!
//! Owns one ordered, append-only turn log per ready repository. A log is
//! created lazily the first time its repository is selected and lives for
//! the rest of the process; nothing is persisted.

use dashmap::DashMap;
use tracing::debug;

use repochat_types::chat::ChatTurn;
use repochat_types::error::SessionError;
use repochat_types::repo::RepoRef;

/// Owns the session-log mapping.
///
/// Constructed empty at session start and shared by reference with every
/// component that reads or appends turns.
#[derive(Debug, Default)]
pub struct ChatSessionStore {
    sessions: DashMap<RepoRef, Vec<ChatTurn>>,
}

impl ChatSessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty log for `repo` if none exists.
    ///
    /// Idempotent: an existing log is never overwritten, so repeated
    /// selection loses no history.
    pub fn ensure(&self, repo: &RepoRef) {
        self.sessions.entry(repo.clone()).or_insert_with(|| {
            debug!(repo = %repo, "session created");
            Vec::new()
        });
    }

    /// Append a turn to the end of `repo`'s log.
    ///
    /// Requires [`ensure`](Self::ensure) to have run for `repo` first;
    /// appending to a non-existent session is a programming error.
    pub fn append(&self, repo: &RepoRef, turn: ChatTurn) -> Result<(), SessionError> {
        match self.sessions.get_mut(repo) {
            Some(mut log) => {
                log.push(turn);
                Ok(())
            }
            None => Err(SessionError::InvalidSession(repo.clone())),
        }
    }

    /// The current log for `repo`, in insertion order.
    ///
    /// Returns a snapshot reflecting the most recent append at the time of
    /// the read.
    pub fn history(&self, repo: &RepoRef) -> Result<Vec<ChatTurn>, SessionError> {
        match self.sessions.get(repo) {
            Some(log) => Ok(log.clone()),
            None => Err(SessionError::InvalidSession(repo.clone())),
        }
    }

    /// Whether a session exists for `repo`.
    pub fn exists(&self, repo: &RepoRef) -> bool {
        self.sessions.contains_key(repo)
    }

    /// Number of turns in `repo`'s log; zero when no session exists.
    pub fn turn_count(&self, repo: &RepoRef) -> usize {
        self.sessions.get(repo).map(|log| log.len()).unwrap_or(0)
    }
}
