//! Selection stage - turn a plan step into an API calling plan

use crate::completion::Completer;
use crate::error::Result;
use crate::matcher::EndpointMatcher;
use crate::prompts::{self, SELECTOR_PROMPT};
use crate::scenario::Scenario;
use crate::spec::SpecIndex;
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};

/// Observation fed back when the selector names an unknown endpoint.
pub const UNKNOWN_ENDPOINT_FEEDBACK: &str =
    "The API you called is not in the list of available APIs. Please use another API.";

static CALLING_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"API calling \d+: ?").unwrap());

static REFUSAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^No API call needed.(.*)").unwrap());

/// The answer carried by a "No API call needed." selection, if it is one.
pub fn refusal(api_plan: &str) -> Option<String> {
    REFUSAL_REGEX
        .captures(api_plan)
        .map(|caps| caps[1].trim().to_string())
}

/// Chooses the API call(s) that carry out a plan step.
#[async_trait]
pub trait Selector: Send + Sync {
    async fn select(&self, plan: &str, background: &str) -> Result<String>;
}

/// [`Selector`] backed by the completion service.
#[derive(Debug, Clone)]
pub struct LlmSelector {
    completer: Completer,
    scenario: Scenario,
    index: Arc<SpecIndex>,
    correction_attempts: usize,
}

impl LlmSelector {
    pub fn new(completer: Completer, scenario: Scenario, index: Arc<SpecIndex>) -> Self {
        Self {
            completer,
            scenario,
            index,
            correction_attempts: 0,
        }
    }

    /// Re-prompt up to `attempts` times when the output names no known endpoint.
    pub fn with_correction_attempts(mut self, attempts: usize) -> Self {
        self.correction_attempts = attempts;
        self
    }

    fn stop() -> [&'static str; 2] {
        ["\nAPI response:", "\n\tAPI response:"]
    }

    pub fn build_prompt(&self, plan: &str, background: &str, scratchpad: &str, step: usize) -> String {
        let endpoints = self.index.endpoint_listing();
        let step = step.to_string();
        prompts::render(
            SELECTOR_PROMPT,
            &[
                ("endpoints", endpoints.as_str()),
                ("icl_examples", self.scenario.selector_examples()),
                ("background", background),
                ("plan", plan),
                ("agent_scratchpad", scratchpad),
                ("step", step.as_str()),
            ],
        )
    }
}

#[async_trait]
impl Selector for LlmSelector {
    async fn select(&self, plan: &str, background: &str) -> Result<String> {
        let matcher = EndpointMatcher::new(&self.index);
        let mut scratchpad = String::new();
        let mut attempt = 0;

        loop {
            let prompt = self.build_prompt(plan, background, &scratchpad, attempt + 1);
            let output = self.completer.complete(&prompt, &Self::stop()).await?;
            let api_plan = CALLING_PREFIX_REGEX.replace_all(&output, "").trim().to_string();
            info!(stage = "API Selector", attempt = attempt + 1, "{}", api_plan);

            let known = refusal(&api_plan).is_some() || !matcher.candidates(&api_plan).is_empty();
            if known || attempt >= self.correction_attempts {
                return Ok(api_plan);
            }

            warn!(api_plan = %api_plan, "Selected endpoint is not in the API description");
            scratchpad.push_str(&format!(
                "API calling {}: {}\nAPI response: {}\n",
                attempt + 1,
                api_plan,
                UNKNOWN_ENDPOINT_FEEDBACK
            ));
            attempt += 1;
        }
    }
}
