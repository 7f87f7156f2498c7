//! Planning stage - decompose the user query into natural-language steps

use crate::agent::HistoryEntry;
use crate::completion::Completer;
use crate::error::Result;
use crate::prompts::{self, PLANNER_PROMPT};
use crate::scenario::Scenario;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

/// Phrase that marks the planner's final answer.
pub const FINAL_ANSWER: &str = "Final Answer";

const OBSERVATION_PREFIX: &str = "API response: ";

static STEP_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Plan step \d+: ?").unwrap());

/// Whether a plan carries the final answer.
pub fn is_final(plan: &str) -> bool {
    plan.contains(FINAL_ANSWER)
}

/// Produces the next plan step from the query and everything done so far.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, query: &str, history: &[HistoryEntry]) -> Result<String>;
}

/// [`Planner`] backed by the completion service.
#[derive(Debug, Clone)]
pub struct LlmPlanner {
    completer: Completer,
    scenario: Scenario,
}

impl LlmPlanner {
    pub fn new(completer: Completer, scenario: Scenario) -> Self {
        Self {
            completer,
            scenario,
        }
    }

    fn stop() -> [&'static str; 2] {
        ["\nAPI response:", "\n\tAPI response:"]
    }

    fn scratchpad(history: &[HistoryEntry]) -> String {
        history
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                format!(
                    "Plan step {}: {}\n{}{}\n",
                    i + 1,
                    entry.plan,
                    OBSERVATION_PREFIX,
                    entry.result
                )
            })
            .collect()
    }

    pub fn build_prompt(&self, query: &str, history: &[HistoryEntry]) -> String {
        let scratchpad = Self::scratchpad(history);
        let step = (history.len() + 1).to_string();
        prompts::render(
            PLANNER_PROMPT,
            &[
                ("icl_examples", self.scenario.planner_examples()),
                ("input", query),
                ("agent_scratchpad", scratchpad.as_str()),
                ("step", step.as_str()),
            ],
        )
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn plan(&self, query: &str, history: &[HistoryEntry]) -> Result<String> {
        let prompt = self.build_prompt(query, history);
        let output = self.completer.complete(&prompt, &Self::stop()).await?;
        let plan = STEP_PREFIX_REGEX.replace_all(&output, "").trim().to_string();
        info!(stage = "Planner", step = history.len() + 1, "{}", plan);
        Ok(plan)
    }
}
