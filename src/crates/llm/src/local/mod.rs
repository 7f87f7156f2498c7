//! Local provider implementations.
//!
//! These need no API key and keep prompts on the local machine.
//!
//! - **Ollama** - popular local LLM runner with wide model support

pub mod ollama;

pub use ollama::OllamaClient;
