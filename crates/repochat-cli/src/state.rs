//! Application state wiring the session components together.
//!
//! The core components are generic over the `RagBackend` port; AppState
//! pins them to the HTTP implementation and owns the process-wide stores
//! (ingestion ledger, session-log mapping), created empty at startup and
//! discarded at exit.

use std::sync::Arc;

use secrecy::SecretString;

use repochat_core::catalog::RepositoryCatalog;
use repochat_core::dispatch::ChatDispatcher;
use repochat_core::event::EventBus;
use repochat_core::ingest::IngestionController;
use repochat_core::session::ChatSessionStore;
use repochat_infra::config::{load_client_config, resolve_config_dir};
use repochat_infra::http::HttpRagClient;
use repochat_types::config::ClientConfig;

/// Shared application state for all CLI commands.
pub struct AppState {
    pub config: ClientConfig,
    pub catalog: RepositoryCatalog<HttpRagClient>,
    pub ingest: Arc<IngestionController<HttpRagClient>>,
    pub sessions: Arc<ChatSessionStore>,
    pub dispatcher: ChatDispatcher<HttpRagClient>,
}

impl AppState {
    /// Initialize the application state: load config, build the HTTP
    /// backend, wire the session components around it.
    pub async fn init(access_token: Option<SecretString>) -> anyhow::Result<Self> {
        let config = load_client_config(&resolve_config_dir()).await;

        let mut client = HttpRagClient::new(&config);
        if let Some(token) = access_token {
            client = client.with_access_token(token);
        }
        let backend = Arc::new(client);

        let sessions = Arc::new(ChatSessionStore::new());
        let ingest = Arc::new(IngestionController::new(backend.clone(), EventBus::new(64)));

        Ok(Self {
            catalog: RepositoryCatalog::new(backend.clone()),
            dispatcher: ChatDispatcher::new(backend, sessions.clone()),
            ingest,
            sessions,
            config,
        })
    }
}
