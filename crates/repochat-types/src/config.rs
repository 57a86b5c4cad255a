//! Client configuration.
//!
//! Deserialized from `config.toml` in the repochat config directory. Every
//! field has a default so a missing or partial file still yields a working
//! configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the repochat client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the remote answering service.
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Per-request timeout in seconds. Ingestion of a large repository can
    /// take minutes on the remote side.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_service_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.service_url, "http://127.0.0.1:5000");
        assert_eq!(config.request_timeout_secs, 300);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"service_url":"https://rag.example.com"}"#).unwrap();
        assert_eq!(config.service_url, "https://rag.example.com");
        assert_eq!(config.request_timeout_secs, 300);
    }
}
