//! HttpRagClient -- concrete [`RagBackend`] implementation over HTTP.
//!
//! Talks to the remote answering service's three endpoints: `GET /repos`,
//! `POST /embed`, and `POST /chat`. Each call is a single attempt; there is
//! no retry or backoff at this layer.
//!
//! The OAuth access token is wrapped in [`secrecy::SecretString`] and is
//! never logged or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use repochat_core::remote::RagBackend;
use repochat_types::chat::ChatTurn;
use repochat_types::config::ClientConfig;
use repochat_types::error::BackendError;
use repochat_types::repo::RepoRef;

use super::types::{ChatAnswerBody, ChatRequestBody, EmbedRequestBody};

/// HTTP client for the remote answering service.
pub struct HttpRagClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<SecretString>,
}

impl HttpRagClient {
    /// Create a new client from configuration.
    pub fn new(config: &ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: config.service_url.trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Attach the OAuth access token obtained from the connect flow.
    pub fn with_access_token(mut self, token: SecretString) -> Self {
        self.access_token = Some(token);
        self
    }

    /// Whether an access token is attached.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token when one is present.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Map a non-2xx status and its body onto the error taxonomy.
    fn status_error(status: u16, body: String) -> BackendError {
        match status {
            401 | 403 => BackendError::AuthenticationFailed,
            _ => BackendError::Http { status, body },
        }
    }

    fn transport_error(err: reqwest::Error) -> BackendError {
        BackendError::Transport(err.to_string())
    }
}

// HttpRagClient does not derive Debug so the access token can never end up
// in formatted output.

impl RagBackend for HttpRagClient {
    async fn list_repos(&self) -> Result<Vec<String>, BackendError> {
        let url = self.url("/repos");
        debug!(url = %url, "fetching repository listing");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status.as_u16(), body));
        }

        response
            .json::<Vec<String>>()
            .await
            .map_err(|e| BackendError::Deserialization(format!("failed to parse listing: {e}")))
    }

    async fn embed_repo(&self, repo_url: &str) -> Result<(), BackendError> {
        let url = self.url("/embed");
        debug!(url = %url, repo_url, "requesting ingestion");

        let body = EmbedRequestBody {
            repo_url: repo_url.to_string(),
        };
        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status.as_u16(), body));
        }

        // The success body carries no contract beyond the status code.
        Ok(())
    }

    async fn ask(
        &self,
        repo: &RepoRef,
        query: &str,
        history: &[ChatTurn],
    ) -> Result<String, BackendError> {
        let url = self.url("/chat");
        debug!(url = %url, repo = %repo, "sending chat query");

        let body = ChatRequestBody {
            query: query.to_string(),
            repo: repo.as_str().to_string(),
            chat_history: history.to_vec(),
        };
        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status.as_u16(), body));
        }

        let answer: ChatAnswerBody = response
            .json()
            .await
            .map_err(|e| BackendError::Deserialization(format!("failed to parse answer: {e}")))?;
        Ok(answer.answer)
    }
}
