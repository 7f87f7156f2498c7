//! Orchestrator - the plan, select, call, record loop
//!
//! ```text
//! PLANNING -> SELECTING -> CALLING -> RECORDING -> PLANNING | DONE
//! ```
//!
//! The loop is strictly sequential: every step's prompt depends on the
//! results of all earlier steps. The iteration and wall-clock budgets are
//! checked once per iteration, so an in-flight request always completes.
//! Running out of budget is not an error; the last plan becomes the answer.

use crate::caller::{ApiCaller, Caller};
use crate::completion::{Completer, CompletionSettings};
use crate::config::RestPilotConfig;
use crate::docs::DocShaper;
use crate::error::Result;
use crate::interpreter::LlmInterpreter;
use crate::planner::{is_final, LlmPlanner, Planner, FINAL_ANSWER};
use crate::requests::{HttpRequests, RequestsWrapper};
use crate::selector::{refusal, LlmSelector, Selector};
use crate::spec::SpecIndex;
use llm::ChatModel;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

/// One completed step: the plan and what came of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub plan: String,
    pub result: String,
}

impl HistoryEntry {
    pub fn new(plan: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            plan: plan.into(),
            result: result.into(),
        }
    }
}

/// Mutable state of a single run. Entries are only ever appended.
#[derive(Debug)]
pub struct RunState {
    pub iterations: usize,
    started: Instant,
    history: Vec<HistoryEntry>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            iterations: 0,
            started: Instant::now(),
            history: Vec::new(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn record(&mut self, plan: impl Into<String>, result: impl Into<String>) {
        self.history.push(HistoryEntry::new(plan, result));
    }

    /// Results so far, newline-joined, for the selector and caller.
    pub fn background(&self) -> String {
        if self.history.is_empty() {
            return "No background".to_string();
        }
        self.history
            .iter()
            .map(|entry| entry.result.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The planner produced a final answer.
    Finished,
    /// Iteration or time budget ran out first.
    BudgetExceeded,
}

/// Result of one query.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub query: String,
    /// The last plan text.
    pub answer: String,
    pub status: RunStatus,
    pub iterations: usize,
    pub elapsed: Duration,
    pub history: Vec<HistoryEntry>,
}

impl RunOutcome {
    /// Text after `Final Answer:`, or the whole answer when there is none.
    pub fn final_answer(&self) -> &str {
        match self.answer.rsplit_once(FINAL_ANSWER) {
            Some((_, rest)) => rest.trim_start_matches(':').trim(),
            None => self.answer.trim(),
        }
    }
}

/// Run budgets; `None` is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub max_iterations: Option<usize>,
    pub max_execution_time: Option<Duration>,
}

impl Limits {
    fn allow(&self, state: &RunState) -> bool {
        let iterations_left = self.max_iterations.map_or(true, |max| state.iterations < max);
        let time_left = self
            .max_execution_time
            .map_or(true, |max| state.elapsed() < max);
        iterations_left && time_left
    }
}

/// The agent: planner, selector and caller wired into one loop.
#[derive(Clone)]
pub struct RestAgent {
    planner: Arc<dyn Planner>,
    selector: Arc<dyn Selector>,
    caller: Arc<dyn Caller>,
    limits: Limits,
}

impl std::fmt::Debug for RestAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestAgent").field("limits", &self.limits).finish()
    }
}

impl RestAgent {
    pub fn new(planner: Arc<dyn Planner>, selector: Arc<dyn Selector>, caller: Arc<dyn Caller>) -> Self {
        Self {
            planner,
            selector,
            caller,
            limits: Limits {
                max_iterations: Some(15),
                max_execution_time: None,
            },
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Wire the LLM-backed stages and an HTTP client from configuration.
    pub fn from_config(
        config: &RestPilotConfig,
        model: Arc<dyn ChatModel>,
        index: Arc<SpecIndex>,
    ) -> Result<Self> {
        let mut requests =
            HttpRequests::new(Duration::from_secs(config.api.timeout_secs))?;
        if let Some(token) = &config.api.access_token {
            requests = requests.with_access_token(token.clone());
        }
        Self::with_requests(config, model, index, Arc::new(requests))
    }

    /// Like [`RestAgent::from_config`] with a caller-supplied HTTP collaborator.
    pub fn with_requests(
        config: &RestPilotConfig,
        model: Arc<dyn ChatModel>,
        index: Arc<SpecIndex>,
        requests: Arc<dyn RequestsWrapper>,
    ) -> Result<Self> {
        let scenario = config.agent.scenario()?;
        let completer = Completer::new(model).with_settings(CompletionSettings {
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        });

        let caller_shaper = DocShaper::new(config.agent.doc_token_limit, config.agent.with_response)?;
        let parser_shaper = DocShaper::new(config.agent.doc_token_limit, true)?;
        let interpreter = Arc::new(LlmInterpreter::new(completer.clone(), parser_shaper));

        let planner = Arc::new(LlmPlanner::new(completer.clone(), scenario));
        let selector = Arc::new(
            LlmSelector::new(completer.clone(), scenario, index.clone())
                .with_correction_attempts(config.agent.selector_correction_attempts),
        );
        let caller = Arc::new(
            ApiCaller::new(completer, index, requests, interpreter, caller_shaper, scenario)
                .with_response_char_limit(config.agent.response_char_limit),
        );

        Ok(Self::new(planner, selector, caller).with_limits(Limits {
            max_iterations: config.agent.max_iterations,
            max_execution_time: config.agent.max_execution_time(),
        }))
    }

    /// Answer one query.
    ///
    /// Step-local failures of the caller become the step's result as
    /// `Error: <message>`; failures of planner or selector end the run.
    pub async fn run(&self, query: &str) -> Result<RunOutcome> {
        let run_id = Uuid::new_v4();
        let mut state = RunState::new();
        info!(%run_id, query, "Starting run");

        // Only re-plans are checked for the final answer, so the first plan
        // always goes through one selection and call.
        let mut plan = self.planner.plan(query, state.history()).await?;
        let mut status = RunStatus::BudgetExceeded;

        while status != RunStatus::Finished && self.limits.allow(&state) {
            let background = state.background();
            let api_plan = self.selector.select(&plan, &background).await?;

            let result = match refusal(&api_plan) {
                Some(answer) => answer,
                None => match self.caller.execute(&api_plan, &background).await {
                    Ok(result) => result,
                    Err(e) if e.is_step_local() => {
                        warn!(%run_id, iteration = state.iterations, error = %e, "Step failed");
                        format!("Error: {}", e)
                    }
                    Err(e) => return Err(e),
                },
            };

            state.record(plan, result);
            state.iterations += 1;

            plan = self.planner.plan(query, state.history()).await?;
            if is_final(&plan) {
                status = RunStatus::Finished;
            }
        }

        if status == RunStatus::BudgetExceeded {
            warn!(%run_id, iterations = state.iterations, "Run stopped by budget");
        }
        info!(
            %run_id,
            iterations = state.iterations,
            elapsed_ms = state.elapsed().as_millis() as u64,
            "Run finished"
        );

        Ok(RunOutcome {
            run_id,
            query: query.to_string(),
            answer: plan,
            status,
            iterations: state.iterations,
            elapsed: state.elapsed(),
            history: state.history,
        })
    }
}
