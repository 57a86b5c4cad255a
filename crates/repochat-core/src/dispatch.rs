//! Chat dispatch: the send protocol for one conversation turn.
//!
//! Appends the user's turn synchronously before the network call, so their
//! message is visible regardless of latency or failure, then asks the
//! remote service and appends the answer. The history sent with the query
//! is the log as it stood before this turn, for context continuity.

use std::sync::Arc;

use tracing::{debug, warn};

use repochat_types::chat::ChatTurn;
use repochat_types::error::ChatError;
use repochat_types::repo::RepoRef;

use crate::remote::RagBackend;
use crate::session::ChatSessionStore;

/// Result of a [`ChatDispatcher::send`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The query was answered and the bot turn appended.
    Answered { answer: String },
    /// Empty or whitespace-only input: nothing appended, nothing sent.
    Ignored,
}

/// Sends a user query plus the repository's history to the remote answering
/// endpoint and appends the returned answer to the session.
///
/// Sends for different repositories are fully independent. Two overlapping
/// sends for the same repository race on the history read-then-append; that
/// matches the remote protocol's expectations and is not serialized here.
pub struct ChatDispatcher<B> {
    backend: Arc<B>,
    store: Arc<ChatSessionStore>,
}

impl<B: RagBackend> ChatDispatcher<B> {
    /// Create a dispatcher over the shared session store.
    pub fn new(backend: Arc<B>, store: Arc<ChatSessionStore>) -> Self {
        Self { backend, store }
    }

    /// Send one query against `repo`'s session.
    ///
    /// The session must already exist ([`ChatSessionStore::ensure`]). On
    /// failure the user's turn stays in the log with no bot reply and no
    /// retry -- an unanswered query is the visible signal.
    pub async fn send(&self, repo: &RepoRef, text: &str) -> Result<SendOutcome, ChatError> {
        if text.trim().is_empty() {
            debug!(repo = %repo, "ignoring empty message");
            return Ok(SendOutcome::Ignored);
        }

        // Snapshot before the append: the query itself is not part of the
        // history the remote sees.
        let history = self.store.history(repo)?;
        self.store.append(repo, ChatTurn::user(text))?;

        match self.backend.ask(repo, text, &history).await {
            Ok(answer) => {
                self.store.append(repo, ChatTurn::bot(answer.clone()))?;
                debug!(repo = %repo, turns = history.len() + 2, "turn answered");
                Ok(SendOutcome::Answered { answer })
            }
            Err(err) => {
                warn!(repo = %repo, error = %err, "chat request failed");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use repochat_types::chat::Speaker;
    use repochat_types::error::BackendError;

    /// Backend that records each ask call's query and history snapshot.
    #[derive(Default)]
    struct RecordingBackend {
        ask_calls: AtomicUsize,
        last_request: Mutex<Option<(String, Vec<ChatTurn>)>>,
        fail: bool,
    }

    impl RecordingBackend {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }
    }

    impl RagBackend for RecordingBackend {
        async fn list_repos(&self) -> Result<Vec<String>, BackendError> {
            Ok(Vec::new())
        }

        async fn embed_repo(&self, _repo_url: &str) -> Result<(), BackendError> {
            Ok(())
        }

        async fn ask(
            &self,
            _repo: &RepoRef,
            query: &str,
            history: &[ChatTurn],
        ) -> Result<String, BackendError> {
            self.ask_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some((query.to_string(), history.to_vec()));
            if self.fail {
                Err(BackendError::Http {
                    status: 500,
                    body: "no answer".to_string(),
                })
            } else {
                Ok(format!("answer to: {query}"))
            }
        }
    }

    fn dispatcher(
        backend: Arc<RecordingBackend>,
    ) -> (ChatDispatcher<RecordingBackend>, Arc<ChatSessionStore>) {
        let store = Arc::new(ChatSessionStore::new());
        (ChatDispatcher::new(backend, store.clone()), store)
    }

    #[tokio::test]
    async fn test_send_appends_user_then_bot() {
        let backend = Arc::new(RecordingBackend::default());
        let (dispatcher, store) = dispatcher(backend.clone());
        let foo = RepoRef::new("foo");
        store.ensure(&foo);

        let outcome = dispatcher.send(&foo, "What does main.py do?").await.unwrap();

        assert_eq!(
            outcome,
            SendOutcome::Answered {
                answer: "answer to: What does main.py do?".to_string()
            }
        );
        let log = store.history(&foo).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].speaker, Speaker::User);
        assert_eq!(log[0].text, "What does main.py do?");
        assert_eq!(log[1].speaker, Speaker::Bot);
    }

    #[tokio::test]
    async fn test_sent_history_excludes_current_turn() {
        let backend = Arc::new(RecordingBackend::default());
        let (dispatcher, store) = dispatcher(backend.clone());
        let foo = RepoRef::new("foo");
        store.ensure(&foo);

        dispatcher.send(&foo, "first question").await.unwrap();
        dispatcher.send(&foo, "second question").await.unwrap();

        let (query, history) = backend.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(query, "second question");
        // The second request carries only the first exchange, not the
        // just-appended user turn.
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "first question");
        assert_eq!(history[1].speaker, Speaker::Bot);
    }

    #[tokio::test]
    async fn test_blank_input_is_a_noop() {
        let backend = Arc::new(RecordingBackend::default());
        let (dispatcher, store) = dispatcher(backend.clone());
        let foo = RepoRef::new("foo");
        store.ensure(&foo);

        assert_eq!(dispatcher.send(&foo, "").await.unwrap(), SendOutcome::Ignored);
        assert_eq!(
            dispatcher.send(&foo, "   ").await.unwrap(),
            SendOutcome::Ignored
        );

        assert_eq!(store.turn_count(&foo), 0);
        assert_eq!(backend.ask_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_send_without_session_appends_nothing() {
        let backend = Arc::new(RecordingBackend::default());
        let (dispatcher, store) = dispatcher(backend.clone());
        let ghost = RepoRef::new("ghost");

        let err = dispatcher.send(&ghost, "anyone there?").await.unwrap_err();

        assert!(matches!(err, ChatError::Session(_)));
        assert!(!store.exists(&ghost));
        assert_eq!(backend.ask_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_send_keeps_user_turn() {
        let backend = Arc::new(RecordingBackend::failing());
        let (dispatcher, store) = dispatcher(backend);
        let foo = RepoRef::new("foo");
        store.ensure(&foo);

        let err = dispatcher.send(&foo, "still there?").await.unwrap_err();

        assert!(matches!(err, ChatError::Backend(_)));
        // No rollback: the unanswered user turn stays visible.
        let log = store.history(&foo).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].speaker, Speaker::User);
    }

    #[tokio::test]
    async fn test_send_does_not_touch_other_sessions() {
        let backend = Arc::new(RecordingBackend::default());
        let (dispatcher, store) = dispatcher(backend);
        let foo = RepoRef::new("foo");
        let bar = RepoRef::new("bar");
        store.ensure(&foo);
        store.ensure(&bar);

        dispatcher.send(&foo, "only for foo").await.unwrap();

        assert_eq!(store.turn_count(&foo), 2);
        assert_eq!(store.turn_count(&bar), 0);
    }
}
