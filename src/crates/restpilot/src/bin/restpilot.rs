//! RestPilot CLI - answer questions against a REST API
//!
//! Main entry point for the restpilot command-line tool.

use anyhow::Context;
use clap::{Parser, Subcommand};
use restpilot::{cli, init_logging, load_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "restpilot")]
#[command(about = "RestPilot - plan, select and call against a REST API", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file, applied over the user and project files
    #[arg(short, long, global = true, env = "RESTPILOT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single query
    Run {
        /// Natural-language query
        query: String,
        /// Print every plan step and its API response
        #[arg(long)]
        show_steps: bool,
    },

    /// Answer every query of a dataset file
    Batch {
        /// JSON file of the form [{"query": "..."}]
        dataset: PathBuf,
        /// Index of the first query to run
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Number of queries to run (default: all)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List the endpoints of the configured API
    Endpoints {
        /// Only show endpoints containing this text
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show which endpoints a piece of text resolves to
    Match {
        /// Text naming an endpoint, e.g. "GET /person/5026/movie_credits"
        text: String,
    },

    /// Check configuration, API spec and completion provider
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let config = load_config(args.config.clone())
        .await
        .context("Failed to load configuration")?;
    let logging = init_logging(&config.logging).context("Failed to initialize logging")?;

    match args.command {
        Commands::Run { query, show_steps } => {
            cli::handle_run(&config, &query, show_steps).await?;
        }
        Commands::Batch {
            dataset,
            start,
            limit,
        } => {
            cli::handle_batch(&config, &logging, &dataset, start, limit)
                .await
                .with_context(|| format!("Batch run over {} failed", dataset.display()))?;
        }
        Commands::Endpoints { filter } => {
            cli::handle_endpoints(&config, filter.as_deref())?;
        }
        Commands::Match { text } => {
            cli::handle_match(&config, &text)?;
        }
        Commands::Check => {
            cli::handle_check(&config).await?;
        }
    }

    Ok(())
}
