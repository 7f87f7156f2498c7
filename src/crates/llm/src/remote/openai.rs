//! OpenAI-compatible chat completions client.
//!
//! Works against OpenAI itself and every provider that mirrors its
//! `/chat/completions` endpoint (Cerebras, OpenRouter, vLLM, ...). Only the
//! base URL and the model name change.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::remote::OpenAiClient;
//! use llm::{ChatModel, ChatRequest, Message, RemoteLlmConfig};
//!
//! let config = RemoteLlmConfig::from_env("OPENAI_API_KEY", "https://api.openai.com/v1", "gpt-4o")?;
//! let client = OpenAiClient::new(config)?;
//!
//! let request = ChatRequest::new(vec![Message::human("Hello!")]);
//! let response = client.chat(request).await?;
//! ```

use crate::chat::{ChatModel, ChatRequest, ChatResponse, Message, UsageMetadata};
use crate::config::RemoteLlmConfig;
use crate::error::{LlmError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// OpenAI-compatible API client.
#[derive(Clone)]
pub struct OpenAiClient {
    config: RemoteLlmConfig,
    client: Client,
}

impl OpenAiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: RemoteLlmConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn convert_message(msg: &Message) -> OpenAiMessage {
        OpenAiMessage {
            role: msg.role.as_openai_str().to_string(),
            content: Some(msg.content.clone()),
        }
    }

    fn convert_response(openai_resp: OpenAiResponse) -> Result<ChatResponse> {
        let choice = openai_resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("response has no choices".to_string()))?;

        let usage = openai_resp
            .usage
            .map(|u| UsageMetadata::new(u.prompt_tokens, u.completion_tokens));

        let mut metadata = HashMap::new();
        metadata.insert(
            "model".to_string(),
            serde_json::Value::String(openai_resp.model),
        );
        metadata.insert(
            "finish_reason".to_string(),
            serde_json::Value::String(choice.finish_reason.unwrap_or_default()),
        );

        Ok(ChatResponse {
            message: Message::assistant(choice.message.content.unwrap_or_default()),
            usage,
            metadata,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let req_body = OpenAiRequest {
            model: self.config.model.clone(),
            messages: request.messages.iter().map(Self::convert_message).collect(),
            temperature: request.config.temperature,
            max_tokens: request.config.max_tokens,
            stop: if request.config.stop_sequences.is_empty() {
                None
            } else {
                Some(request.config.stop_sequences.clone())
            },
            stream: false,
        };

        let mut req = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&req_body);

        if let Some(org) = &self.config.organization {
            req = req.header("OpenAI-Organization", org);
        }

        debug!(model = %self.config.model, %url, "Sending chat completion request");
        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status("OpenAI", status, error_text));
        }

        let openai_resp: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Self::convert_response(openai_resp)
    }

    async fn is_available(&self) -> Result<bool> {
        let url = format!("{}/models", self.config.base_url);
        match self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAiClient {
        let config = RemoteLlmConfig::new("test-key", server.uri(), "llama-3.3-70b");
        OpenAiClient::new(config).unwrap()
    }

    #[test]
    fn test_message_conversion() {
        let msg = OpenAiClient::convert_message(&Message::human("Hello"));
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_empty_choices_is_invalid() {
        let resp = OpenAiResponse {
            model: "m".to_string(),
            choices: vec![],
            usage: None,
        };
        assert!(matches!(
            OpenAiClient::convert_response(resp),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_chat_sends_stop_sequences() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "llama-3.3-70b",
                "stop": ["\nObservation:", "\n\tObservation:"],
                "temperature": 0.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1,
                "model": "llama-3.3-70b",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Operation: GET"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = ChatRequest::new(vec![Message::human("Plan: ...")])
            .with_temperature(0.0)
            .with_stop_sequences(vec![
                "\nObservation:".to_string(),
                "\n\tObservation:".to_string(),
            ]);

        let response = client_for(&server).chat(request).await.unwrap();
        assert_eq!(response.text(), "Operation: GET");
        assert_eq!(response.usage.unwrap().total_tokens, 13);
        assert_eq!(response.metadata["finish_reason"], "stop");
    }

    #[tokio::test]
    async fn test_chat_maps_rate_limit() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("too many requests"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .chat(ChatRequest::new(vec![Message::human("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::RateLimitExceeded(_)));
    }
}
