//! Response Interpreter - reduce a raw API response to what the plan asked for

use crate::completion::Completer;
use crate::docs::DocShaper;
use crate::error::Result;
use crate::prompts::{self, PARSER_PROMPT};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::info;

/// Everything the interpreter knows about one executed request.
#[derive(Debug, Clone, Default)]
pub struct InterpretRequest {
    /// Base URL joined with the called endpoint's path template.
    pub api_path: String,
    /// Documentation of the endpoint that was actually called (`Null` if unknown).
    pub api_docs: Value,
    /// Extraction instruction from the action's `output_instructions`.
    pub query: Option<String>,
    /// What the response is about, from the action's `description`.
    pub response_description: String,
    pub params: Option<Map<String, Value>>,
    pub data: Option<Value>,
    /// Response body, already truncated.
    pub response_text: String,
}

impl InterpretRequest {
    /// Request arguments as shown to the model.
    pub fn api_param(&self) -> Value {
        json!({
            "params": self.params.clone().map(Value::Object).unwrap_or_else(|| json!("No parameters")),
            "data": self.data.clone().unwrap_or_else(|| json!("No request body")),
        })
    }
}

/// Turns an API response into a short natural-language answer.
#[async_trait]
pub trait Interpreter: Send + Sync {
    async fn interpret(&self, request: &InterpretRequest) -> Result<String>;
}

/// [`Interpreter`] backed by the completion service.
#[derive(Debug, Clone)]
pub struct LlmInterpreter {
    completer: Completer,
    shaper: DocShaper,
}

impl LlmInterpreter {
    pub fn new(completer: Completer, shaper: DocShaper) -> Self {
        Self { completer, shaper }
    }

    fn build_prompt(&self, request: &InterpretRequest) -> Result<String> {
        let description = request
            .api_docs
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("No description");
        let schema = self
            .shaper
            .response_docs(&request.api_docs)?
            .unwrap_or_else(|| "No response schema".to_string());
        let api_param = request.api_param().to_string();
        let query = request
            .query
            .as_deref()
            .unwrap_or("Summarize the information in the response.");

        Ok(prompts::render(
            PARSER_PROMPT,
            &[
                ("api_path", request.api_path.as_str()),
                ("api_description", description),
                ("response_schema", schema.as_str()),
                ("api_param", api_param.as_str()),
                ("json", request.response_text.as_str()),
                ("response_description", request.response_description.as_str()),
                ("query", query),
            ],
        ))
    }
}

#[async_trait]
impl Interpreter for LlmInterpreter {
    async fn interpret(&self, request: &InterpretRequest) -> Result<String> {
        let prompt = self.build_prompt(request)?;
        let output = self.completer.complete(&prompt, &[]).await?;
        let output = output.trim().to_string();
        info!(stage = "Parser", api_path = %request.api_path, "{}", output);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::DOC_TOKEN_LIMIT;
    use crate::testing::{fixtures, ScriptedModel};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_prompt_carries_request_context() {
        let index = fixtures::tmdb_index().unwrap();
        let endpoint = index.get("GET /person/{person_id}/movie_credits").unwrap();
        let model = Arc::new(ScriptedModel::new([" Seven Samurai (346), Rashomon (548) \n"]));
        let interpreter = LlmInterpreter::new(
            Completer::new(model.clone()),
            DocShaper::new(DOC_TOKEN_LIMIT, false).unwrap(),
        );

        let request = InterpretRequest {
            api_path: "https://api.themoviedb.org/3/person/{person_id}/movie_credits".to_string(),
            api_docs: endpoint.docs().clone(),
            query: Some("What are the names and ids of the movies directed by this person?".to_string()),
            response_description: "The movie credit list of Akira Kurosawa".to_string(),
            params: None,
            data: None,
            response_text: fixtures::kurosawa_movie_credits().to_string(),
        };

        let output = interpreter.interpret(&request).await.unwrap();
        assert_eq!(output, "Seven Samurai (346), Rashomon (548)");

        let prompt = &model.prompts()[0];
        assert!(prompt.contains("returned by calling https://api.themoviedb.org/3/person/{person_id}/movie_credits"));
        assert!(prompt.contains("Get the movie credits for a person."));
        assert!(prompt.contains("crew"));
        assert!(prompt.contains(r#""params":"No parameters""#));
        assert!(prompt.contains(r#""data":"No request body""#));
        assert!(prompt.contains("names and ids of the movies directed"));
        assert!(prompt.contains("Seven Samurai"));
    }

    #[tokio::test]
    async fn test_unknown_endpoint_docs() {
        let model = Arc::new(ScriptedModel::new(["Invalid API key: You must be granted a valid key."]));
        let interpreter = LlmInterpreter::new(
            Completer::new(model.clone()),
            DocShaper::new(DOC_TOKEN_LIMIT, false).unwrap(),
        );

        let request = InterpretRequest {
            api_path: "https://api.themoviedb.org/3/unknown".to_string(),
            params: serde_json::json!({"page": 1}).as_object().cloned(),
            response_text: r#"{"status_code": 7, "status_message": "Invalid API key"}"#.to_string(),
            ..InterpretRequest::default()
        };

        interpreter.interpret(&request).await.unwrap();
        let prompt = &model.prompts()[0];
        assert!(prompt.contains("No response schema"));
        assert!(prompt.contains("API description: No description"));
        assert!(prompt.contains(r#""params":{"page":1}"#));
        assert!(prompt.contains("Summarize the information"));
    }
}
