use thiserror::Error;

use crate::repo::RepoRef;

/// Errors from remote service calls.
///
/// Every variant is a network-level failure: the request could not complete,
/// came back non-2xx, or carried an unparseable body. None of these are
/// retried anywhere -- the affected operation simply fails to progress.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("not authenticated")]
    AuthenticationFailed,

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Errors from repository ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("ingestion failed for '{repo}': {source}")]
    Backend {
        repo: RepoRef,
        #[source]
        source: BackendError,
    },
}

/// Errors from the chat session store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Append or read against a repository that was never selected.
    /// A programming error in correct usage -- `ensure` must run first.
    #[error("no session exists for repository '{0}'")]
    InvalidSession(RepoRef),
}

/// Errors from sending a chat message.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("chat request failed: {0}")]
    Backend(#[from] BackendError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Http {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn test_ingest_error_names_repo() {
        let err = IngestError::Backend {
            repo: RepoRef::new("foo"),
            source: BackendError::Transport("connection refused".to_string()),
        };
        assert!(err.to_string().contains("foo"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::InvalidSession(RepoRef::new("bar"));
        assert_eq!(err.to_string(), "no session exists for repository 'bar'");
    }

    #[test]
    fn test_chat_error_from_session_error() {
        let err: ChatError = SessionError::InvalidSession(RepoRef::new("bar")).into();
        assert!(matches!(err, ChatError::Session(_)));
    }
}
