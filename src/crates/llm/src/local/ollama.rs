//! Ollama client implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::local::OllamaClient;
//! use llm::{ChatModel, ChatRequest, LocalLlmConfig, Message};
//!
//! let config = LocalLlmConfig::new("http://localhost:11434", "llama3.1");
//! let client = OllamaClient::new(config)?;
//!
//! let request = ChatRequest::new(vec![Message::human("Hello!")]);
//! let response = client.chat(request).await?;
//! ```

use crate::chat::{ChatModel, ChatRequest, ChatResponse, Message, MessageRole, UsageMetadata};
use crate::config::LocalLlmConfig;
use crate::error::{LlmError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ollama client for local LLM inference.
#[derive(Clone)]
pub struct OllamaClient {
    config: LocalLlmConfig,
    client: Client,
}

impl OllamaClient {
    /// Create a new Ollama client with the given configuration.
    pub fn new(config: LocalLlmConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn convert_message(msg: &Message) -> OllamaMessage {
        OllamaMessage {
            role: msg.role.as_openai_str().to_string(),
            content: msg.content.clone(),
        }
    }

    fn convert_response(ollama_resp: OllamaResponse) -> ChatResponse {
        let usage = if ollama_resp.prompt_eval_count.is_some() || ollama_resp.eval_count.is_some() {
            Some(UsageMetadata::new(
                ollama_resp.prompt_eval_count.unwrap_or(0),
                ollama_resp.eval_count.unwrap_or(0),
            ))
        } else {
            None
        };

        let mut metadata = HashMap::new();
        metadata.insert(
            "model".to_string(),
            serde_json::Value::String(ollama_resp.model),
        );
        if let Some(total_duration) = ollama_resp.total_duration {
            metadata.insert(
                "total_duration_ns".to_string(),
                serde_json::Value::Number(total_duration.into()),
            );
        }

        ChatResponse {
            message: Message::new(MessageRole::Assistant, ollama_resp.message.content),
            usage,
            metadata,
        }
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/api/chat", self.config.base_url);

        let mut options = HashMap::new();
        if let Some(temp) = request.config.temperature {
            options.insert("temperature", serde_json::Value::from(temp));
        }
        if let Some(max_tokens) = request.config.max_tokens {
            options.insert("num_predict", serde_json::Value::from(max_tokens));
        }
        if !request.config.stop_sequences.is_empty() {
            options.insert("stop", serde_json::Value::from(request.config.stop_sequences.clone()));
        }

        let req_body = OllamaRequest {
            model: self.config.model.clone(),
            messages: request.messages.iter().map(Self::convert_message).collect(),
            stream: false,
            options: if options.is_empty() { None } else { Some(options) },
        };

        let response = self.client.post(&url).json(&req_body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status("Ollama", status, error_text));
        }

        let ollama_resp: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(Self::convert_response(ollama_resp))
    }

    async fn is_available(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.config.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Ollama API types
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<HashMap<&'static str, serde_json::Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: String,
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: Option<usize>,
    #[serde(default)]
    eval_count: Option<usize>,
    #[serde(default)]
    total_duration: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_chat_passes_stop_in_options() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "model": "llama3.1",
                "stream": false,
                "options": {"stop": ["\nAPI response:"]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.1",
                "message": {"role": "assistant", "content": "Get the id of Akira Kurosawa"},
                "done": true,
                "prompt_eval_count": 20,
                "eval_count": 8
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(LocalLlmConfig::new(server.uri(), "llama3.1")).unwrap();
        let request = ChatRequest::new(vec![Message::human("User query: ...")])
            .with_stop_sequences(vec!["\nAPI response:".to_string()]);

        let response = client.chat(request).await.unwrap();
        assert_eq!(response.text(), "Get the id of Akira Kurosawa");
        assert_eq!(response.usage.unwrap().total_tokens, 28);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let client = OllamaClient::new(LocalLlmConfig::new("http://127.0.0.1:9", "llama3.1")).unwrap();
        assert!(!client.is_available().await.unwrap());
    }
}
