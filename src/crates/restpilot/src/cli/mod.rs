//! CLI command implementations
//!
//! Provides command handlers for the restpilot CLI binary.

pub mod inspect;
pub mod run;

pub use inspect::{handle_check, handle_endpoints, handle_match};
pub use run::{handle_batch, handle_run, run_batch, BatchSummary, DatasetEntry};

use crate::config::{ApiConfig, RestPilotConfig};
use crate::error::{AgentError, Result};
use crate::provider::LlmProvider;
use crate::spec::{reduce_openapi_spec, ReduceOptions, ReducedSpec, SpecIndex};
use crate::RestAgent;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Load the API description named by `[api].spec_path`.
///
/// A document with a top-level `endpoints` list is taken as an already
/// reduced spec; anything else is treated as raw OpenAPI and reduced.
pub fn load_index(config: &ApiConfig) -> Result<SpecIndex> {
    let content = std::fs::read_to_string(&config.spec_path).map_err(|e| {
        AgentError::Config(format!(
            "Failed to read API spec {}: {}",
            config.spec_path.display(),
            e
        ))
    })?;
    let raw: Value = serde_json::from_str(&content)?;

    let spec: ReducedSpec = if raw.get("endpoints").is_some() {
        serde_json::from_value(raw)?
    } else {
        reduce_openapi_spec(
            &raw,
            &ReduceOptions {
                only_required: config.only_required,
                merge_allof: config.merge_allof,
                ..ReduceOptions::default()
            },
        )?
    };

    let index = SpecIndex::new(spec)?;
    debug!(
        path = %config.spec_path.display(),
        endpoints = index.len(),
        base_url = index.base_url(),
        "Loaded API spec"
    );
    Ok(index)
}

/// Spec index plus an agent wired to the configured provider.
pub fn build_agent(config: &RestPilotConfig) -> Result<(Arc<SpecIndex>, RestAgent)> {
    let index = Arc::new(load_index(&config.api)?);
    let model = Arc::new(LlmProvider::from_config(&config.llm)?);
    let agent = RestAgent::from_config(config, model, index.clone())?;
    Ok((index, agent))
}
