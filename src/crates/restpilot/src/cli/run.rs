//! Run and batch command handlers

use super::build_agent;
use crate::agent::{RestAgent, RunOutcome, RunStatus};
use crate::config::RestPilotConfig;
use crate::error::{AgentError, Result};
use crate::logging::LoggingHandle;
use colored::Colorize;
use serde::Deserialize;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// One query of a batch dataset. Other fields in the file are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetEntry {
    pub query: String,
}

/// Counts of a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub finished: usize,
    pub budget_exceeded: usize,
    /// Dataset index and error message of every query that failed.
    pub failed: Vec<(usize, String)>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.finished + self.budget_exceeded + self.failed.len()
    }
}

/// Handle run command
pub async fn handle_run(config: &RestPilotConfig, query: &str, show_steps: bool) -> Result<()> {
    let (_, agent) = build_agent(config)?;
    let outcome = agent.run(query).await?;
    print_outcome(&outcome, show_steps);
    Ok(())
}

/// Handle batch command
pub async fn handle_batch(
    config: &RestPilotConfig,
    logging: &LoggingHandle,
    dataset: &Path,
    start: usize,
    limit: Option<usize>,
) -> Result<BatchSummary> {
    let entries = load_dataset(dataset)?;
    let (_, agent) = build_agent(config)?;
    let scenario = config.agent.scenario()?;

    let summary = run_batch(&agent, &entries, start, limit, scenario.as_str(), logging).await?;

    println!();
    println!(
        "{} {} queries: {} finished, {} out of budget, {} failed",
        "Batch done:".bold(),
        summary.total(),
        summary.finished.to_string().green(),
        summary.budget_exceeded.to_string().yellow(),
        summary.failed.len().to_string().red()
    );
    for (index, error) in &summary.failed {
        println!("  #{}: {}", index, error);
    }

    Ok(summary)
}

/// Read a dataset file of the form `[{"query": "..."}, ...]`.
pub fn load_dataset(path: &Path) -> Result<Vec<DatasetEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AgentError::Config(format!("Failed to read dataset {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Run the queries `entries[start..start + limit]` one after another.
///
/// A failing query is recorded in the summary and the batch moves on.
pub async fn run_batch(
    agent: &RestAgent,
    entries: &[DatasetEntry],
    start: usize,
    limit: Option<usize>,
    scenario: &str,
    logging: &LoggingHandle,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    let selected = entries
        .iter()
        .enumerate()
        .skip(start)
        .take(limit.unwrap_or(usize::MAX));

    for (index, entry) in selected {
        logging.start_run(scenario, index)?;
        let started = Instant::now();
        info!(index, query = %entry.query, "Running query");

        match agent.run(&entry.query).await {
            Ok(outcome) => {
                println!("{} {}", format!("#{}", index).cyan().bold(), entry.query);
                print_outcome(&outcome, false);
                match outcome.status {
                    RunStatus::Finished => summary.finished += 1,
                    RunStatus::BudgetExceeded => summary.budget_exceeded += 1,
                }
            }
            Err(e) => {
                warn!(index, error = %e, "Query failed");
                eprintln!("{} #{}: {}", "✗ Query failed".red().bold(), index, e);
                summary.failed.push((index, e.to_string()));
            }
        }

        info!(index, execution_secs = started.elapsed().as_secs_f64(), "Execution time");
        logging.finish_run()?;
    }

    Ok(summary)
}

fn print_outcome(outcome: &RunOutcome, show_steps: bool) {
    if show_steps {
        for (i, entry) in outcome.history.iter().enumerate() {
            println!("{} {}", format!("Plan step {}:", i + 1).cyan().bold(), entry.plan);
            println!("{} {}", "API response:".dimmed(), entry.result);
        }
    }

    match outcome.status {
        RunStatus::Finished => {
            println!("{} {}", "✓ Final answer:".green().bold(), outcome.final_answer());
        }
        RunStatus::BudgetExceeded => {
            println!("{} {}", "⚠ Stopped by budget, last plan:".yellow().bold(), outcome.answer);
        }
    }
    println!("  Iterations: {}", outcome.iterations);
    println!("  Elapsed: {:.2}s", outcome.elapsed.as_secs_f64());
}
