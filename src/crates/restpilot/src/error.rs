//! Error types for restpilot
//!
//! Step-local errors (`Parse`, `UnsupportedOperation`, `MalformedAction`,
//! `Http`) abort a single execution step; the agent records their message as
//! the step's observation. `EndpointUnresolved` never leaves the caller.
//! A non-2xx API response is not an error at all.

use thiserror::Error;

/// Result type alias for restpilot operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Main error type for restpilot operations
#[derive(Debug, Error)]
pub enum AgentError {
    /// Completion text had neither an `Operation:`/`Input:` pair nor a completion marker
    #[error("Could not parse LLM output: `{0}`")]
    Parse(String),

    /// Operation token is not one of the supported HTTP verbs
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Action input is not a valid JSON action
    #[error("Could not parse action input: {input} ({reason})")]
    MalformedAction { input: String, reason: String },

    /// No endpoint in the spec index matches the text
    #[error("No matching endpoint for: {0}")]
    EndpointUnresolved(String),

    /// The HTTP request could not be performed at all
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Completion service error
    #[error("LLM error: {0}")]
    Llm(#[from] llm::LlmError),

    /// Invalid or unsupported API description
    #[error("Spec error: {0}")]
    Spec(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AgentError {
    /// Errors that only abort the current execution step.
    ///
    /// The agent turns these into an observation for the planner instead of
    /// ending the run.
    pub fn is_step_local(&self) -> bool {
        matches!(
            self,
            AgentError::Parse(_)
                | AgentError::UnsupportedOperation(_)
                | AgentError::MalformedAction { .. }
                | AgentError::EndpointUnresolved(_)
                | AgentError::Http(_)
        )
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AgentError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
