//! Error types for completion providers.

use thiserror::Error;

/// Result type for LLM operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur when talking to a completion provider.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize/deserialize data.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// API authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// API key not found in environment.
    #[error("API key not found: {0}")]
    ApiKeyNotFound(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid response from provider.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider answered with a non-success status.
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LlmError {
    /// Transport-level failures and throttling; the request itself was fine.
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::HttpError(_) | LlmError::RateLimitExceeded(_))
    }

    /// Check if this error is due to authentication.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            LlmError::AuthenticationError(_) | LlmError::ApiKeyNotFound(_)
        )
    }

    /// Map a non-success HTTP status from a provider to an error.
    pub(crate) fn from_status(provider: &str, status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => LlmError::AuthenticationError(body),
            429 => LlmError::RateLimitExceeded(body),
            _ => LlmError::ProviderError(format!("{} API error {}: {}", provider, status, body)),
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = LlmError::from_status("OpenAI", reqwest::StatusCode::UNAUTHORIZED, "bad key".into());
        assert!(err.is_auth_error());

        let err = LlmError::from_status("OpenAI", reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down".into());
        assert!(err.is_transient());

        let err = LlmError::from_status("Ollama", reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom".into());
        assert_eq!(err.to_string(), "Provider error: Ollama API error 500 Internal Server Error: boom");
    }
}
