//! Inspection command handlers: endpoints, match and check

use super::load_index;
use crate::config::RestPilotConfig;
use crate::error::Result;
use crate::matcher::{Candidate, EndpointMatcher};
use crate::provider::LlmProvider;
use crate::spec::SpecIndex;
use colored::Colorize;
use llm::ChatModel;

/// Handle endpoints command
pub fn handle_endpoints(config: &RestPilotConfig, filter: Option<&str>) -> Result<()> {
    let index = load_index(&config.api)?;
    let names = filter_endpoints(&index, filter);

    if names.is_empty() {
        println!("{}", "No endpoints found".yellow());
        return Ok(());
    }

    println!("Endpoints of {}:", index.base_url());
    for name in names {
        println!("  {}", name);
    }
    Ok(())
}

/// Handle match command
pub fn handle_match(config: &RestPilotConfig, text: &str) -> Result<()> {
    let index = load_index(&config.api)?;
    let candidates = EndpointMatcher::new(&index).candidates(text);

    if candidates.is_empty() {
        println!("{}", "No matching endpoint".yellow());
        return Ok(());
    }

    let last = candidates.len() - 1;
    println!("{:<4} {:<6} {:<13} {}", "#", "Exact", "Placeholders", "Endpoint");
    println!("{}", "-".repeat(60));
    for (i, candidate) in candidates.iter().enumerate() {
        let line = candidate_line(i, candidate);
        if i == last {
            println!("{}", line.green().bold());
        } else {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Handle check command
pub async fn handle_check(config: &RestPilotConfig) -> Result<()> {
    let scenario = config.agent.scenario()?;
    let index = load_index(&config.api)?;
    println!("{} {}", "✓ Scenario:".green().bold(), scenario);
    println!(
        "{} {} endpoints at {}",
        "✓ API spec:".green().bold(),
        index.len(),
        index.base_url()
    );

    let provider = LlmProvider::from_config(&config.llm)?;
    match provider.is_available().await {
        Ok(true) => println!(
            "{} {} ({})",
            "✓ Completion provider:".green().bold(),
            config.llm.provider,
            provider.model_name()
        ),
        Ok(false) => println!(
            "{} {} is not reachable",
            "✗ Completion provider:".red().bold(),
            config.llm.provider
        ),
        Err(e) => println!("{} {}", "✗ Completion provider:".red().bold(), e),
    }
    Ok(())
}

/// Endpoint identities containing `filter` (case-insensitive), in spec order.
pub fn filter_endpoints(index: &SpecIndex, filter: Option<&str>) -> Vec<String> {
    let needle = filter.map(str::to_lowercase);
    index
        .endpoints()
        .iter()
        .filter(|e| match &needle {
            Some(needle) => e.name().to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .map(|e| e.name().to_string())
        .collect()
}

fn candidate_line(position: usize, candidate: &Candidate) -> String {
    format!(
        "{:<4} {:<6} {:<13} {}",
        position + 1,
        candidate.exact,
        candidate.placeholders,
        candidate.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_filter_endpoints() {
        let index = fixtures::tmdb_index().unwrap();

        let all = filter_endpoints(&index, None);
        assert_eq!(all.len(), index.len());

        let person = filter_endpoints(&index, Some("PERSON"));
        assert!(!person.is_empty());
        assert!(person.iter().all(|name| name.contains("/person")));
    }

    #[test]
    fn test_candidate_line() {
        let index = fixtures::tmdb_index().unwrap();
        let candidates = EndpointMatcher::new(&index).candidates("GET /person/5026/movie_credits");
        let line = candidate_line(0, candidates.last().unwrap());
        assert!(line.starts_with("1 "));
        assert!(line.ends_with("GET /person/{person_id}/movie_credits"));
    }
}
