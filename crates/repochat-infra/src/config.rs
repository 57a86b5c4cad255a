//! Client configuration loader.
//!
//! Reads `config.toml` from the repochat config directory (`~/.repochat/`
//! in production) and deserializes it into [`ClientConfig`]. Falls back to
//! defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use repochat_types::config::ClientConfig;

/// Resolve the repochat config directory.
///
/// `~/.repochat` when a home directory exists, `./.repochat` otherwise.
pub fn resolve_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".repochat"))
        .unwrap_or_else(|| PathBuf::from(".repochat"))
}

/// Load client configuration from `{config_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ClientConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_client_config(config_dir: &Path) -> ClientConfig {
    let config_path = config_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config.toml found at {}, using defaults",
                config_path.display()
            );
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ClientConfig::default()
        }
    }
}
