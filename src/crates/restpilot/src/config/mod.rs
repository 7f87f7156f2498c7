//! Configuration management for restpilot
//!
//! Supports dual-location configuration:
//! - User-level: ~/.restpilot/restpilot.toml
//! - Project-level: ./.restpilot/restpilot.toml
//!
//! Project-level config overrides user-level config, and an explicit
//! `--config` file overrides both.

mod loader;
mod schema;

pub use loader::ConfigLoader;
pub use schema::{AgentConfig, ApiConfig, LlmConfig, LoggingConfig, RestPilotConfig};

use crate::error::Result;
use std::path::PathBuf;

/// Load configuration from the default locations plus an optional explicit file.
pub async fn load_config(explicit: Option<PathBuf>) -> Result<RestPilotConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = explicit {
        loader = loader.with_config_file(path);
    }
    loader.load().await
}
