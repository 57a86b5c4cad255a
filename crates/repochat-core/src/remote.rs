//! RagBackend trait definition.
//!
//! This is the core abstraction over the remote answering service: one
//! method per endpoint the client consumes. Uses native async fn in traits
//! (RPITIT, Rust 2024 edition).
//!
//! Implementations live in repochat-infra (e.g., `HttpRagClient`); tests
//! substitute in-memory mocks.

use repochat_types::chat::ChatTurn;
use repochat_types::error::BackendError;
use repochat_types::repo::RepoRef;

/// Trait for the remote retrieval-augmented answering service.
///
/// All three calls are single attempts with no retry -- failure surfaces as
/// a [`BackendError`] and the caller decides what to do with it.
pub trait RagBackend: Send + Sync {
    /// Fetch the clone URLs the connected account can ingest.
    fn list_repos(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, BackendError>> + Send;

    /// Clone and index one repository on the remote service.
    ///
    /// Success means the repository is queryable; the response body carries
    /// no contract beyond the status code.
    fn embed_repo(
        &self,
        repo_url: &str,
    ) -> impl std::future::Future<Output = Result<(), BackendError>> + Send;

    /// Answer a query against an ingested repository.
    ///
    /// `history` is the conversation as it stood before the query being
    /// asked, for context continuity across turns.
    fn ask(
        &self,
        repo: &RepoRef,
        query: &str,
        history: &[ChatTurn],
    ) -> impl std::future::Future<Output = Result<String, BackendError>> + Send;
}
