//! Core chat abstractions shared by every provider.
//!
//! The agent treats text generation as an opaque service: it sends a prompt
//! plus stop sequences and gets text back. [`ChatModel`] is that seam.
//! Implementations handle the specifics of converting messages, making the
//! HTTP call and mapping the provider's response format.
//!
//! # Example Implementation
//!
//! ```rust,ignore
//! use llm::{ChatModel, ChatRequest, ChatResponse, Result};
//! use async_trait::async_trait;
//!
//! struct EchoModel;
//!
//! #[async_trait]
//! impl ChatModel for EchoModel {
//!     async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
//!         let last = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
//!         Ok(ChatResponse::from_text(last))
//!     }
//!
//!     fn model_name(&self) -> &str {
//!         "echo"
//!     }
//! }
//! ```

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Role of a message author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    Human,
    Assistant,
}

impl MessageRole {
    /// Role name in the OpenAI wire format.
    pub fn as_openai_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::Human => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single text message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Human, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// A request to a chat model containing messages and configuration.
///
/// ```rust,ignore
/// let request = ChatRequest::new(vec![Message::human("Plan step 1:")])
///     .with_temperature(0.0)
///     .with_max_tokens(256)
///     .with_stop_sequences(vec!["\nObservation:".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// The conversation messages to send to the model.
    pub messages: Vec<Message>,

    /// Generation parameters.
    pub config: ChatConfig,
}

impl ChatRequest {
    /// Create a new chat request with default configuration.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            config: ChatConfig::default(),
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Set the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = Some(max_tokens);
        self
    }

    /// Add stop sequences that halt generation.
    ///
    /// The agent relies on these to keep the model from writing the next
    /// observation itself.
    pub fn with_stop_sequences(mut self, sequences: Vec<String>) -> Self {
        self.config.stop_sequences = sequences;
        self
    }
}

/// Generation parameters. Providers ignore what they do not support.
#[derive(Debug, Clone, Default)]
pub struct ChatConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
    pub stop_sequences: Vec<String>,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
}

impl UsageMetadata {
    pub fn new(input_tokens: usize, output_tokens: usize) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

/// A complete response from a chat model.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub message: Message,
    pub usage: Option<UsageMetadata>,
    /// Provider-specific extras such as `model` or `finish_reason`.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ChatResponse {
    /// Build an assistant response carrying only text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            message: Message::assistant(text),
            usage: None,
            metadata: HashMap::new(),
        }
    }

    /// The generated text.
    pub fn text(&self) -> &str {
        &self.message.content
    }
}

/// Core trait for chat-based language models.
///
/// Implementations must be `Send + Sync`; the agent shares one model between
/// all of its stages through `Arc<dyn ChatModel>`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a complete response for the request.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Check if the provider is reachable.
    ///
    /// Default implementation assumes availability.
    async fn is_available(&self) -> Result<bool> {
        Ok(true)
    }

    /// Identifier of the model used for requests.
    fn model_name(&self) -> &str;
}
