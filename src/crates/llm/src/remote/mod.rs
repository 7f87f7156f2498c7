//! Remote provider implementations.
//!
//! - **OpenAI-compatible** - OpenAI, Cerebras, OpenRouter and any other
//!   server exposing the `/chat/completions` API

pub mod openai;

pub use openai::OpenAiClient;
