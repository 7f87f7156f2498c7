//! Supported API families

use crate::error::{AgentError, Result};
use crate::prompts;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The API family an agent is configured for.
///
/// Selects the few-shot examples of planner and selector. Spotify also turns
/// on result-type narrowing for `GET /search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Tmdb,
    Spotify,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Tmdb => "tmdb",
            Scenario::Spotify => "spotify",
        }
    }

    pub fn planner_examples(&self) -> &'static str {
        match self {
            Scenario::Tmdb => prompts::TMDB_PLANNER_EXAMPLES,
            Scenario::Spotify => prompts::SPOTIFY_PLANNER_EXAMPLES,
        }
    }

    pub fn selector_examples(&self) -> &'static str {
        match self {
            Scenario::Tmdb => prompts::TMDB_SELECTOR_EXAMPLES,
            Scenario::Spotify => prompts::SPOTIFY_SELECTOR_EXAMPLES,
        }
    }

    /// Whether `GET /search` responses are narrowed to the requested types.
    pub fn narrows_search(&self) -> bool {
        matches!(self, Scenario::Spotify)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("tmdb") => Ok(Scenario::Tmdb),
            s if s.eq_ignore_ascii_case("spotify") => Ok(Scenario::Spotify),
            other => Err(AgentError::Config(format!("Invalid scenario {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario() {
        for name in ["tmdb", "TMDB", "Tmdb"] {
            assert_eq!(name.parse::<Scenario>().unwrap(), Scenario::Tmdb);
        }
        assert_eq!("Spotify".parse::<Scenario>().unwrap(), Scenario::Spotify);
        assert!(matches!("imdb".parse::<Scenario>(), Err(AgentError::Config(_))));
    }

    #[test]
    fn test_examples_differ_per_scenario() {
        assert!(Scenario::Tmdb.planner_examples().contains("movie"));
        assert!(Scenario::Spotify.selector_examples().contains("/me"));
        assert!(Scenario::Spotify.narrows_search());
        assert!(!Scenario::Tmdb.narrows_search());
    }
}
