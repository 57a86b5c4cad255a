//! Repository catalog: the remote listing of clone URLs.
//!
//! A pure read against the listing endpoint. Deliberately uncached -- every
//! call re-fetches so the menu reflects the remote source of truth at the
//! moment it opens.

use std::sync::Arc;

use tracing::debug;

use repochat_types::error::BackendError;

use crate::remote::RagBackend;

/// Fetches the set of repositories available to clone.
pub struct RepositoryCatalog<B> {
    backend: Arc<B>,
}

impl<B: RagBackend> RepositoryCatalog<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Clone URLs the connected account can ingest.
    ///
    /// One network read per call, no local state mutation. Failures
    /// propagate to the caller unchanged.
    pub async fn list_available(&self) -> Result<Vec<String>, BackendError> {
        let urls = self.backend.list_repos().await?;
        debug!(count = urls.len(), "fetched repository catalog");
        Ok(urls)
    }
}
