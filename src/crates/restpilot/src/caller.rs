//! Caller - execute one API calling plan
//!
//! One invocation performs at most one HTTP request:
//!
//! 1. resolve the plan to an endpoint and shape its documentation
//! 2. ask the model for an action (`Operation` + JSON `Input`)
//! 3. stop early on `Execution Result:`
//! 4. perform the request; error statuses flow on like any other body
//! 5. re-resolve the URL that was actually called and interpret the
//!    truncated response against that endpoint's docs

use crate::action::{parse_action, Action, ActionStep};
use crate::completion::Completer;
use crate::docs::{narrow_search_schema, search_type_of, truncate_chars, DocShaper};
use crate::error::{AgentError, Result};
use crate::interpreter::{InterpretRequest, Interpreter};
use crate::matcher::EndpointMatcher;
use crate::prompts::{self, CALLER_EXAMPLES, CALLER_PROMPT};
use crate::requests::RequestsWrapper;
use crate::scenario::Scenario;
use crate::spec::{Method, SpecIndex};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

const OBSERVATION_PREFIX: &str = "Observation: ";

/// Endpoint whose response schema is narrowed by result type.
const SEARCH_ENDPOINT: &str = "GET /search";

/// Executes one step of an API calling plan.
#[async_trait]
pub trait Caller: Send + Sync {
    /// Returns the step's result text. Error statuses from the API are part
    /// of the result, never an `Err`.
    async fn execute(&self, api_plan: &str, background: &str) -> Result<String>;
}

/// [`Caller`] that prompts the model for an action and performs it over HTTP.
#[derive(Clone)]
pub struct ApiCaller {
    completer: Completer,
    index: Arc<SpecIndex>,
    requests: Arc<dyn RequestsWrapper>,
    interpreter: Arc<dyn Interpreter>,
    shaper: DocShaper,
    scenario: Scenario,
    response_char_limit: usize,
}

impl std::fmt::Debug for ApiCaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCaller")
            .field("completer", &self.completer)
            .field("base_url", &self.index.base_url())
            .field("scenario", &self.scenario)
            .field("response_char_limit", &self.response_char_limit)
            .finish()
    }
}

impl ApiCaller {
    pub fn new(
        completer: Completer,
        index: Arc<SpecIndex>,
        requests: Arc<dyn RequestsWrapper>,
        interpreter: Arc<dyn Interpreter>,
        shaper: DocShaper,
        scenario: Scenario,
    ) -> Self {
        Self {
            completer,
            index,
            requests,
            interpreter,
            shaper,
            scenario,
            response_char_limit: crate::docs::RESPONSE_CHAR_LIMIT,
        }
    }

    pub fn with_response_char_limit(mut self, limit: usize) -> Self {
        self.response_char_limit = limit;
        self
    }

    fn stop() -> [&'static str; 2] {
        ["\nObservation:", "\n\tObservation:"]
    }

    /// Documentation excerpt and base URL for the endpoint a plan refers to.
    ///
    /// Both are empty when the plan names no known endpoint.
    pub fn prepare_docs(&self, api_plan: &str) -> Result<(String, String)> {
        match EndpointMatcher::new(&self.index).resolve(api_plan) {
            Ok(endpoint) => {
                debug!(endpoint = %endpoint.name(), "Resolved API plan");
                let docs = self.shaper.caller_docs(endpoint)?;
                Ok((docs, self.index.base_url().to_string()))
            }
            Err(AgentError::EndpointUnresolved(plan)) => {
                warn!(api_plan = %plan, "No endpoint matches the API plan, calling without documentation");
                Ok((String::new(), String::new()))
            }
            Err(e) => Err(e),
        }
    }

    pub fn build_prompt(&self, api_plan: &str, background: &str, docs: &str, api_url: &str) -> String {
        let examples = CALLER_EXAMPLES.join("\n\n");
        prompts::render(
            CALLER_PROMPT,
            &[
                ("api_url", api_url),
                ("api_docs", docs),
                ("icl_examples", examples.as_str()),
                ("api_plan", api_plan),
                ("background", background),
            ],
        )
    }

    /// Absolute URL for an action; relative paths are joined to the base URL.
    fn request_url(&self, action: &Action) -> String {
        if action.url.starts_with('/') {
            format!("{}{}", self.index.base_url(), action.url)
        } else {
            action.url.clone()
        }
    }

    /// Interpretation context for the endpoint that was actually called.
    fn called_endpoint_context(&self, method: Method, url: &str, action: &Action) -> (String, Value) {
        let matcher = EndpointMatcher::new(&self.index);
        let endpoint = match matcher.resolve_called(method, url) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                warn!(url, error = %e, "Called URL matches no documented endpoint");
                return (url.to_string(), Value::Null);
            }
        };

        let api_path = format!("{}{}", self.index.base_url(), endpoint.path());
        let mut docs = endpoint.docs().clone();
        if self.scenario.narrows_search() && endpoint.name() == SEARCH_ENDPOINT {
            if let Some(search_type) = search_type_of(action.params.as_ref(), url) {
                debug!(search_type = %search_type, "Narrowing search response schema");
                docs = narrow_search_schema(&docs, &search_type);
            }
        }
        (api_path, docs)
    }
}

#[async_trait]
impl Caller for ApiCaller {
    async fn execute(&self, api_plan: &str, background: &str) -> Result<String> {
        let (docs, api_url) = self.prepare_docs(api_plan)?;
        let prompt = self.build_prompt(api_plan, background, &docs, &api_url);

        let output = self.completer.complete(&prompt, &Self::stop()).await?;
        info!(stage = "Caller", "{}", output);

        let action = match parse_action(&output)? {
            ActionStep::Done(result) => return Ok(result),
            ActionStep::Call(action) => action,
        };

        let url = self.request_url(&action);
        let method = action.method;
        let data = if method.has_body() { action.data.as_ref() } else { None };
        let response = self
            .requests
            .request(method, &url, action.params.as_ref(), data)
            .await?;
        if !response.is_success() {
            warn!(%method, url = %url, status = response.status, "API returned an error status");
        }

        let response_text = truncate_chars(&response.text, self.response_char_limit).to_string();
        let (api_path, api_docs) = self.called_endpoint_context(method, &url, &action);

        let request = InterpretRequest {
            api_path,
            api_docs,
            query: action.output_instructions.clone(),
            response_description: action.description.clone(),
            params: action.params.clone(),
            data: action.data.clone(),
            response_text,
        };
        let parsed = self.interpreter.interpret(&request).await?;

        Ok(format!("{}\n{}{}", output, OBSERVATION_PREFIX, parsed))
    }
}
