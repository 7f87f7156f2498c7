//! Completion provider selection
//!
//! Maps the `[llm]` config section to one of the `llm` crate's clients.
//! Cerebras and OpenRouter speak the OpenAI chat-completions protocol and
//! only differ in their default base URL.

use crate::config::LlmConfig;
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use llm::config::{LocalLlmConfig, RemoteLlmConfig};
use llm::{ChatModel, ChatRequest, ChatResponse};
use std::time::Duration;
use tracing::debug;

/// A configured completion provider
pub enum LlmProvider {
    Ollama(llm::local::OllamaClient),
    OpenAi(llm::remote::OpenAiClient),
}

impl std::fmt::Debug for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama(_) => write!(f, "LlmProvider::Ollama"),
            Self::OpenAi(_) => write!(f, "LlmProvider::OpenAi"),
        }
    }
}

impl LlmProvider {
    /// Create a provider from the `[llm]` config section
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let provider = config.provider.to_lowercase();
        let timeout = Duration::from_secs(config.timeout_secs);
        debug!(provider = %provider, model = %config.model, "Creating completion provider");

        let remote_base = match provider.as_str() {
            "ollama" => {
                let local_config = LocalLlmConfig::new(
                    config
                        .api_base
                        .clone()
                        .unwrap_or_else(|| "http://localhost:11434".to_string()),
                    config.model.clone(),
                )
                .with_timeout(timeout);
                return Ok(Self::Ollama(llm::local::OllamaClient::new(local_config)?));
            }
            "openai" => "https://api.openai.com/v1",
            "cerebras" => "https://api.cerebras.ai/v1",
            "openrouter" => "https://openrouter.ai/api/v1",
            _ => {
                return Err(AgentError::Config(format!(
                    "Unsupported LLM provider: {}. Available: openai, cerebras, openrouter, ollama",
                    provider
                )))
            }
        };

        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AgentError::Config(format!("{} API key not configured", provider)))?;

        let remote_config = RemoteLlmConfig::new(
            api_key,
            config.api_base.clone().unwrap_or_else(|| remote_base.to_string()),
            config.model.clone(),
        )
        .with_timeout(timeout);
        Ok(Self::OpenAi(llm::remote::OpenAiClient::new(remote_config)?))
    }
}

#[async_trait]
impl ChatModel for LlmProvider {
    async fn chat(&self, request: ChatRequest) -> llm::Result<ChatResponse> {
        match self {
            Self::Ollama(client) => client.chat(request).await,
            Self::OpenAi(client) => client.chat(request).await,
        }
    }

    async fn is_available(&self) -> llm::Result<bool> {
        match self {
            Self::Ollama(client) => client.is_available().await,
            Self::OpenAi(client) => client.is_available().await,
        }
    }

    fn model_name(&self) -> &str {
        match self {
            Self::Ollama(client) => client.model_name(),
            Self::OpenAi(client) => client.model_name(),
        }
    }
}
