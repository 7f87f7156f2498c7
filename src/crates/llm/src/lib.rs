//! Text-completion providers for restpilot.
//!
//! This crate defines the provider-agnostic [`ChatModel`] trait that the agent
//! talks to, plus concrete clients for local and remote servers.
//!
//! # Local Providers
//!
//! - **Ollama** - local runner exposing `/api/chat`
//!
//! # Remote Providers
//!
//! - **OpenAI-compatible** - any server implementing `/chat/completions`
//!   (OpenAI, Cerebras, OpenRouter, vLLM, ...)
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use llm::remote::OpenAiClient;
//! use llm::{ChatModel, ChatRequest, Message, RemoteLlmConfig};
//!
//! #[tokio::main]
//! async fn main() -> llm::Result<()> {
//!     let config = RemoteLlmConfig::from_env(
//!         "CEREBRAS_API_KEY",
//!         "https://api.cerebras.ai/v1",
//!         "llama-3.3-70b",
//!     )?;
//!     let client = OpenAiClient::new(config)?;
//!
//!     let request = ChatRequest::new(vec![Message::human("Plan step 1:")])
//!         .with_temperature(0.0)
//!         .with_stop_sequences(vec!["\nAPI response:".to_string()]);
//!
//!     let response = client.chat(request).await?;
//!     println!("{}", response.text());
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod config;
pub mod error;

#[cfg(feature = "local")]
pub mod local;

#[cfg(feature = "remote")]
pub mod remote;

// Re-export commonly used types
pub use chat::{ChatConfig, ChatModel, ChatRequest, ChatResponse, Message, MessageRole, UsageMetadata};
pub use config::{LocalLlmConfig, RemoteLlmConfig};
pub use error::{LlmError, Result};
