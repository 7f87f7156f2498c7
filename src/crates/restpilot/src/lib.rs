//! # RestPilot - plan, select and call against a REST API
//!
//! RestPilot answers a natural-language query by driving a text-completion
//! model through a plan/act/observe loop against a REST API described by an
//! OpenAPI document.
//!
//! ## Features
//!
//! - **Planner** - decomposes the query into natural-language sub-goals
//! - **Selector** - turns a sub-goal into a concrete `METHOD /path` plan
//! - **Caller** - writes the request, executes it and interprets the response
//! - **Endpoint Matcher** - resolves free text to a canonical endpoint
//! - **Dual-Location Config** - user-level and project-level configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use restpilot::{load_config, LlmProvider, RestAgent, SpecIndex};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = load_config(None).await?;
//! let index = Arc::new(SpecIndex::from_reduced_file("specs/tmdb_reduced.json")?);
//! let model = Arc::new(LlmProvider::from_config(&config.llm)?);
//!
//! let agent = RestAgent::from_config(&config, model, index)?;
//! let outcome = agent.run("Who directed Seven Samurai?").await?;
//! println!("{}", outcome.final_answer());
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod action;
pub mod agent;
pub mod caller;
pub mod completion;
pub mod docs;
pub mod interpreter;
pub mod matcher;
pub mod planner;
pub mod prompts;
pub mod requests;
pub mod scenario;
pub mod selector;
pub mod spec;

// Ambient modules
pub mod cli;
pub mod config;
pub mod logging;
pub mod provider;
pub mod testing;

// Error types and utilities
mod error;

// Error types
pub use error::{AgentError, Result};

// Re-export the agent surface
pub use agent::{HistoryEntry, Limits, RestAgent, RunOutcome, RunState, RunStatus};
pub use caller::{ApiCaller, Caller};
pub use interpreter::{InterpretRequest, Interpreter, LlmInterpreter};
pub use planner::{LlmPlanner, Planner};
pub use selector::{LlmSelector, Selector};

// Re-export building blocks
pub use action::{parse_action, Action, ActionStep};
pub use completion::{Completer, CompletionSettings};
pub use docs::DocShaper;
pub use matcher::{Candidate, EndpointMatcher};
pub use requests::{ApiResponse, HttpRequests, RequestsWrapper};
pub use scenario::Scenario;
pub use spec::{Endpoint, Method, ReducedSpec, SpecIndex};

// Re-export config and provider types
pub use config::{load_config, ConfigLoader, RestPilotConfig};
pub use logging::{init_logging, LoggingHandle};
pub use provider::LlmProvider;
