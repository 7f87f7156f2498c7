//! Common test utilities and setup

use restpilot::testing::{fixtures, ScriptedModel};
use restpilot::{RestAgent, RestPilotConfig, SpecIndex};
use std::sync::Arc;
use wiremock::MockServer;

/// Caller completion for the Kurosawa filmography step.
pub const KUROSAWA_CALL: &str = r#"Operation: GET
Input: {
    "url": "/person/5026/movie_credits",
    "description": "The movie credit list of Akira Kurosawa.",
    "output_instructions": "What are the names and ids of the movies directed by this person?"
}"#;

/// Default configuration with a fast HTTP timeout.
pub fn test_config() -> RestPilotConfig {
    let mut config = RestPilotConfig::default();
    config.api.timeout_secs = 5;
    config
}

/// TMDB index pointing at the mock server.
pub fn mock_index(server: &MockServer) -> Arc<SpecIndex> {
    Arc::new(fixtures::tmdb_index_at(&server.uri()).expect("Failed to build TMDB index"))
}

/// Agent over the mock server, driven by `model`.
pub fn setup_agent(config: &RestPilotConfig, server: &MockServer, model: Arc<ScriptedModel>) -> RestAgent {
    RestAgent::from_config(config, model, mock_index(server)).expect("Failed to build agent")
}
