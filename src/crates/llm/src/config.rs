//! Connection settings for completion providers.

use crate::error::{LlmError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for a provider running on localhost or the local network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalLlmConfig {
    /// Base URL of the server, e.g. `http://localhost:11434` for Ollama.
    pub base_url: String,

    /// Model name/identifier.
    pub model: String,

    /// Request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl LocalLlmConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: trim_base(base_url.into()),
            model: model.into(),
            timeout: default_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Settings for a hosted provider that needs an API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    /// API key sent as a bearer token.
    pub api_key: String,

    /// Base URL for the API, e.g. `https://api.cerebras.ai/v1`.
    pub base_url: String,

    /// Model name/identifier.
    pub model: String,

    /// Request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Organization ID, for providers that support it.
    pub organization: Option<String>,
}

impl RemoteLlmConfig {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: trim_base(base_url.into()),
            model: model.into(),
            timeout: default_timeout(),
            organization: None,
        }
    }

    /// Read the API key from an environment variable.
    pub fn from_env(
        env_var: &str,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = std::env::var(env_var)
            .map_err(|_| LlmError::ApiKeyNotFound(format!("Environment variable: {}", env_var)))?;

        Ok(Self::new(api_key, base_url, model))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_config_builder() {
        let config = LocalLlmConfig::new("http://localhost:11434/", "llama3")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, "llama3");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_remote_config_builder() {
        let config = RemoteLlmConfig::new("test-key", "https://api.cerebras.ai/v1", "llama-3.3-70b")
            .with_timeout(Duration::from_secs(120))
            .with_organization("org-123");

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "https://api.cerebras.ai/v1");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.organization.as_deref(), Some("org-123"));
    }

    #[test]
    fn test_remote_config_missing_env() {
        let err = RemoteLlmConfig::from_env("RESTPILOT_TEST_NO_SUCH_KEY", "https://x", "m").unwrap_err();
        assert!(err.is_auth_error());
    }
}
