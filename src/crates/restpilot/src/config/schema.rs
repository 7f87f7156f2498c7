//! Configuration schema for restpilot

use crate::error::Result;
use crate::scenario::Scenario;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main restpilot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestPilotConfig {
    /// Completion provider configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Agent loop configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Target API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider: "openai", "cerebras", "openrouter" or "ollama"
    pub provider: String,

    /// Model name
    pub model: String,

    /// API key (supports environment variable interpolation)
    pub api_key: Option<String>,

    /// Override of the provider's base URL
    pub api_base: Option<String>,

    pub temperature: f32,

    pub max_tokens: Option<usize>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "cerebras".to_string(),
            model: "llama-3.3-70b".to_string(),
            api_key: None,
            api_base: None,
            temperature: 0.0,
            max_tokens: Some(256),
            timeout_secs: 120,
        }
    }
}

/// Agent loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// API family: "tmdb" or "spotify"
    pub scenario: String,

    /// Iteration ceiling; `None` is unbounded
    pub max_iterations: Option<usize>,

    /// Wall-clock ceiling in seconds; `None` is unbounded
    pub max_execution_secs: Option<u64>,

    /// Keep response schemas in the caller's documentation
    pub with_response: bool,

    pub doc_token_limit: usize,

    pub response_char_limit: usize,

    /// Re-prompts when the selector names an unknown endpoint
    pub selector_correction_attempts: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            scenario: "tmdb".to_string(),
            max_iterations: Some(15),
            max_execution_secs: None,
            with_response: false,
            doc_token_limit: crate::docs::DOC_TOKEN_LIMIT,
            response_char_limit: crate::docs::RESPONSE_CHAR_LIMIT,
            selector_correction_attempts: 0,
        }
    }
}

impl AgentConfig {
    pub fn scenario(&self) -> Result<Scenario> {
        self.scenario.parse()
    }

    pub fn max_execution_time(&self) -> Option<Duration> {
        self.max_execution_secs.map(Duration::from_secs)
    }
}

/// Target API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// OpenAPI document, or an already reduced spec
    pub spec_path: PathBuf,

    /// Keep only required parameters when reducing
    pub only_required: bool,

    /// Merge `allOf` schemas when reducing
    pub merge_allof: bool,

    /// Bearer token sent with every API request
    pub access_token: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            spec_path: PathBuf::from("specs/tmdb_oas.json"),
            only_required: false,
            merge_allof: false,
            access_token: None,
            timeout_secs: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,

    /// Log format: "compact", "pretty", "json"
    pub format: String,

    /// Enable colored output
    pub colored: bool,

    /// Show timestamps
    pub timestamps: bool,

    /// Directory for per-query log files
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            colored: true,
            timestamps: true,
            log_dir: None,
        }
    }
}

impl RestPilotConfig {
    /// Resolve environment variables in configuration values
    ///
    /// Supports ${VAR_NAME} syntax in string fields
    pub fn resolve_env_vars(&mut self) {
        for value in [
            &mut self.llm.api_key,
            &mut self.llm.api_base,
            &mut self.api.access_token,
        ]
        .into_iter()
        .flatten()
        {
            *value = Self::expand_env_var(value);
        }
    }

    /// Expand a `${VAR}` reference; unknown variables are left as written
    fn expand_env_var(value: &str) -> String {
        match value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
            Some(var_name) => std::env::var(var_name).unwrap_or_else(|_| value.to_string()),
            None => value.to_string(),
        }
    }
}
