//! Ingestion lifecycle controller.
//!
//! Drives a repository from available through loading to ready (or failed):
//! derives the [`RepoRef`] from a clone URL, suppresses duplicate requests
//! via the in-flight set, issues a single embed request against the remote
//! service, and records the resulting state transition.
//!
//! The ledger is the sole cross-call coordination point: the duplicate
//! check and the `Loading` insertion happen under one map entry lock,
//! before the first suspension point, so no interleaving can slip a second
//! request for the same repository past the guard.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info, warn};

use repochat_types::error::IngestError;
use repochat_types::event::IngestEvent;
use repochat_types::repo::{IngestState, RepoRef};

use crate::event::EventBus;
use crate::remote::RagBackend;

/// Result of a [`IngestionController::clone_repo`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneOutcome {
    /// Ingestion succeeded; the repository is now ready for chat.
    Cloned(RepoRef),
    /// The repository was already ready. No request was issued.
    AlreadyReady(RepoRef),
    /// An ingestion for this repository is already in flight. No request
    /// was issued.
    AlreadyLoading(RepoRef),
}

impl CloneOutcome {
    /// The repository this outcome concerns.
    pub fn repo(&self) -> &RepoRef {
        match self {
            CloneOutcome::Cloned(repo)
            | CloneOutcome::AlreadyReady(repo)
            | CloneOutcome::AlreadyLoading(repo) => repo,
        }
    }
}

/// Clears in-flight membership when an ingestion call unwinds without
/// recording a final state (panic, or the future dropped mid-flight).
/// A repository must never stay `Loading` past its call's lifetime.
struct InflightGuard<'a> {
    ledger: &'a DashMap<RepoRef, IngestState>,
    repo: RepoRef,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        if let Some(mut state) = self.ledger.get_mut(&self.repo) {
            if state.is_loading() {
                *state = IngestState::Available;
            }
        }
    }
}

/// Drives the cloning/embedding lifecycle of repositories.
///
/// Generic over [`RagBackend`] so tests can substitute an in-memory mock.
/// All state lives in an owned ledger created empty at session start and
/// discarded at process end; nothing is persisted.
pub struct IngestionController<B> {
    backend: Arc<B>,
    ledger: DashMap<RepoRef, IngestState>,
    events: EventBus,
}

impl<B: RagBackend> IngestionController<B> {
    /// Create a controller with an empty ledger.
    pub fn new(backend: Arc<B>, events: EventBus) -> Self {
        Self {
            backend,
            ledger: DashMap::new(),
            events,
        }
    }

    /// Subscribe to ingestion state transitions.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<IngestEvent> {
        self.events.subscribe()
    }

    /// Clone and embed a repository on the remote service.
    ///
    /// If the derived ref is already ready or already in flight, this is a
    /// no-op and returns without issuing a network request. Otherwise one
    /// embed request is attempted: success moves the ref to `Ready`, failure
    /// records `Failed` and returns the error. Either way the ref has left
    /// the in-flight set by the time this call returns. No retry -- a failed
    /// repository is re-cloned only by an explicit new call.
    pub async fn clone_repo(&self, repo_url: &str) -> Result<CloneOutcome, IngestError> {
        let repo = RepoRef::from_url(repo_url);

        // Duplicate check and Loading insertion under one entry lock, with
        // no await point in between.
        match self.ledger.entry(repo.clone()) {
            Entry::Occupied(mut occupied) => match occupied.get() {
                IngestState::Ready => {
                    debug!(repo = %repo, "already cloned, skipping");
                    return Ok(CloneOutcome::AlreadyReady(repo));
                }
                IngestState::Loading => {
                    debug!(repo = %repo, "ingestion already in flight, skipping");
                    return Ok(CloneOutcome::AlreadyLoading(repo));
                }
                IngestState::Available | IngestState::Failed { .. } => {
                    occupied.insert(IngestState::Loading);
                }
            },
            Entry::Vacant(vacant) => {
                vacant.insert(IngestState::Loading);
            }
        }

        self.events.publish(IngestEvent::Started { repo: repo.clone() });
        info!(repo = %repo, url = repo_url, "ingestion started");

        let guard = InflightGuard {
            ledger: &self.ledger,
            repo: repo.clone(),
        };

        let result = self.backend.embed_repo(repo_url).await;
        match result {
            Ok(()) => {
                self.ledger.insert(repo.clone(), IngestState::Ready);
                drop(guard);
                self.events
                    .publish(IngestEvent::Completed { repo: repo.clone() });
                info!(repo = %repo, "repository ready");
                Ok(CloneOutcome::Cloned(repo))
            }
            Err(source) => {
                let reason = source.to_string();
                self.ledger.insert(
                    repo.clone(),
                    IngestState::Failed {
                        reason: reason.clone(),
                    },
                );
                drop(guard);
                self.events.publish(IngestEvent::Failed {
                    repo: repo.clone(),
                    reason,
                });
                warn!(repo = %repo, error = %source, "ingestion failed");
                Err(IngestError::Backend { repo, source })
            }
        }
    }

    /// Current state of a repository. Unknown refs are `Available`.
    pub fn state(&self, repo: &RepoRef) -> IngestState {
        self.ledger
            .get(repo)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    /// Whether the repository may be selected for chat.
    pub fn is_ready(&self, repo: &RepoRef) -> bool {
        self.state(repo).is_ready()
    }

    /// Ready repositories, sorted by name for stable display.
    pub fn ready(&self) -> Vec<RepoRef> {
        self.refs_in(|state| state.is_ready())
    }

    /// The in-flight set, sorted by name for stable display.
    pub fn loading(&self) -> Vec<RepoRef> {
        self.refs_in(|state| state.is_loading())
    }

    /// All known repositories and their states, sorted by name.
    pub fn snapshot(&self) -> Vec<(RepoRef, IngestState)> {
        let mut all: Vec<_> = self
            .ledger
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        all
    }

    fn refs_in(&self, predicate: impl Fn(&IngestState) -> bool) -> Vec<RepoRef> {
        let mut refs: Vec<_> = self
            .ledger
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.key().clone())
            .collect();
        refs.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        refs
    }
}
