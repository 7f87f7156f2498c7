//! Configuration loader with dual-location support
//!
//! Loads configuration from:
//! 1. Default values
//! 2. User-level config: ~/.restpilot/restpilot.toml
//! 3. Project-level config: ./.restpilot/restpilot.toml
//! 4. An explicit file given on the command line
//!
//! Later configs override earlier ones key by key.

use crate::config::schema::RestPilotConfig;
use crate::error::{AgentError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration loader that handles user, project and explicit configs
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    user_config_path: Option<PathBuf>,
    project_config_path: PathBuf,
    explicit_config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            user_config_path: dirs::home_dir().map(|home| home.join(".restpilot").join("restpilot.toml")),
            project_config_path: PathBuf::from(".restpilot").join("restpilot.toml"),
            explicit_config_path: None,
        }
    }

    /// Add a config file that overrides both default locations. Unlike those,
    /// it must exist.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_config_path = Some(path.into());
        self
    }

    /// Load configuration from every location, later ones taking precedence
    pub async fn load(&self) -> Result<RestPilotConfig> {
        let mut merged = toml::Table::new();
        info!("Loading configuration with defaults");

        let optional = self
            .user_config_path
            .iter()
            .chain(std::iter::once(&self.project_config_path));
        for path in optional {
            if !path.exists() {
                debug!(path = %path.display(), "Config file not found");
                continue;
            }
            merge_tables(&mut merged, Self::read_table(path).await?);
            debug!(path = %path.display(), "Loaded config");
        }

        if let Some(path) = &self.explicit_config_path {
            merge_tables(&mut merged, Self::read_table(path).await?);
            debug!(path = %path.display(), "Loaded explicit config");
        }

        let mut config: RestPilotConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e| AgentError::Config(format!("Failed to parse config: {}", e)))?;
        config.resolve_env_vars();

        info!("Configuration loaded successfully");
        Ok(config)
    }

    async fn read_table(path: &Path) -> Result<toml::Table> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            AgentError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            AgentError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    pub fn user_config_path(&self) -> Option<&Path> {
        self.user_config_path.as_deref()
    }

    pub fn project_config_path(&self) -> &Path {
        &self.project_config_path
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively merge `overlay` into `base`; tables merge, other values replace.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn isolated_loader(dir: &TempDir) -> ConfigLoader {
        ConfigLoader {
            user_config_path: Some(dir.path().join("user.toml")),
            project_config_path: dir.path().join("project.toml"),
            explicit_config_path: None,
        }
    }

    #[test]
    fn test_config_paths() {
        let loader = ConfigLoader::new();
        assert!(loader.project_config_path().ends_with(".restpilot/restpilot.toml"));
        if let Some(user) = loader.user_config_path() {
            assert!(user.ends_with(".restpilot/restpilot.toml"));
        }
    }

    #[tokio::test]
    async fn test_load_returns_defaults_when_no_files() {
        let dir = TempDir::new().unwrap();
        let config = isolated_loader(&dir).load().await.unwrap();

        assert_eq!(config.llm.provider, "cerebras");
        assert_eq!(config.agent.scenario, "tmdb");
        assert_eq!(config.logging.level, "info");
    }

    #[tokio::test]
    async fn test_config_merging_three_levels() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("user.toml"),
            r#"
[llm]
provider = "openai"
model = "gpt-4o"

[agent]
max_iterations = 8
"#,
        )
        .await
        .unwrap();
        fs::write(
            dir.path().join("project.toml"),
            r#"
[llm]
model = "gpt-4o-mini"

[api]
spec_path = "specs/spotify_oas.json"
"#,
        )
        .await
        .unwrap();
        let explicit = dir.path().join("run.toml");
        fs::write(&explicit, "[agent]\nscenario = \"spotify\"\n").await.unwrap();

        let config = isolated_loader(&dir)
            .with_config_file(&explicit)
            .load()
            .await
            .unwrap();

        assert_eq!(config.llm.provider, "openai"); // user
        assert_eq!(config.llm.model, "gpt-4o-mini"); // project over user
        assert_eq!(config.agent.max_iterations, Some(8)); // user
        assert_eq!(config.agent.scenario, "spotify"); // explicit
        assert_eq!(config.api.spec_path, PathBuf::from("specs/spotify_oas.json"));
        assert_eq!(config.logging.format, "compact"); // default
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = isolated_loader(&dir)
            .with_config_file(dir.path().join("missing.toml"))
            .load()
            .await;
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[tokio::test]
    async fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("project.toml"), "[llm\nprovider = ").await.unwrap();
        let result = isolated_loader(&dir).load().await;
        assert!(matches!(result, Err(AgentError::Config(_))));
    }
}
