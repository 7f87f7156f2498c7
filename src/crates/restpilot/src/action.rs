//! Action Parser - turn caller completions into HTTP actions
//!
//! The completion is expected in the `Thought / Operation / Input` format.
//! Parsing is deliberately forgiving about surrounding noise: code fences and
//! commentary around the JSON input are cut away by keeping only the text
//! between the first `{` and the last `}`.

use crate::error::{AgentError, Result};
use crate::spec::Method;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Marker that ends the caller's work for a plan.
pub const COMPLETION_MARKER: &str = "Execution Result:";

static OPERATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Operation:\s*(.*?)\n*Input:\s*(.*)").unwrap());

/// A structured HTTP request produced by the caller model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(skip_deserializing, default = "default_method")]
    pub method: Method,
    pub url: String,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
    #[serde(default)]
    pub data: Option<Value>,
    /// What the response is about.
    #[serde(default = "default_description")]
    pub description: String,
    /// What to extract from the response.
    #[serde(default)]
    pub output_instructions: Option<String>,
}

fn default_method() -> Method {
    Method::Get
}

fn default_description() -> String {
    "No description".to_string()
}

/// Outcome of parsing one caller completion.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionStep {
    /// The plan is complete; carries the final summary.
    Done(String),
    /// One HTTP request to perform.
    Call(Action),
}

/// Parse a caller completion into an [`ActionStep`].
pub fn parse_action(text: &str) -> Result<ActionStep> {
    if let Some((_, result)) = text.rsplit_once(COMPLETION_MARKER) {
        return Ok(ActionStep::Done(result.trim().to_string()));
    }

    let caps = OPERATION_REGEX
        .captures(text)
        .ok_or_else(|| AgentError::Parse(text.to_string()))?;
    let method: Method = caps[1].trim().parse()?;
    let input = extract_json_block(&caps[2])?;

    let mut action: Action =
        serde_json::from_str(input).map_err(|e| AgentError::MalformedAction {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
    action.method = method;
    Ok(ActionStep::Call(action))
}

/// The substring from the first `{` to the last `}` of the fence-stripped input.
pub fn extract_json_block(input: &str) -> Result<&str> {
    let input = input.trim().trim_matches('`');
    match (input.find('{'), input.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&input[start..=end]),
        _ => Err(AgentError::MalformedAction {
            input: input.to_string(),
            reason: "no JSON object found".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_completion_marker() {
        let step = parse_action("Thought: all done\nExecution Result: The movies are Ran and Ikiru.").unwrap();
        assert_eq!(step, ActionStep::Done("The movies are Ran and Ikiru.".to_string()));

        // Marker wins even if an operation is present
        let step = parse_action("Operation: GET\nInput: {\"url\": \"x\"}\nExecution Result: X").unwrap();
        assert_eq!(step, ActionStep::Done("X".to_string()));
    }

    #[test]
    fn test_fenced_input() {
        let step = parse_action("Operation: GET\nInput: ```{\"url\":\"a\"}```").unwrap();
        let ActionStep::Call(action) = step else {
            panic!("expected a call");
        };
        assert_eq!(action.method, Method::Get);
        assert_eq!(action.url, "a");
        assert_eq!(action.description, "No description");
        assert!(action.params.is_none());
        assert!(action.output_instructions.is_none());
    }

    #[test]
    fn test_full_action() {
        let text = r#"Thought: I need the movie credits of Akira Kurosawa.
Operation: GET
Input: ```json
{
    "url": "https://api.themoviedb.org/3/person/5026/movie_credits",
    "params": {"language": "en-US"},
    "description": "The API response is the movie credit list of Akira Kurosawa (id 5026)",
    "output_instructions": "What are the names and ids of the movies directed by this person?"
}
```
That should do it."#;
        let ActionStep::Call(action) = parse_action(text).unwrap() else {
            panic!("expected a call");
        };
        assert_eq!(action.url, "https://api.themoviedb.org/3/person/5026/movie_credits");
        assert_eq!(action.params.unwrap()["language"], json!("en-US"));
        assert_eq!(
            action.output_instructions.as_deref(),
            Some("What are the names and ids of the movies directed by this person?")
        );
    }

    #[test]
    fn test_patch_supported() {
        let text = "Operation: PATCH\nInput: {\"url\": \"/items/1\", \"data\": {\"name\": \"x\"}}";
        let ActionStep::Call(action) = parse_action(text).unwrap() else {
            panic!("expected a call");
        };
        assert_eq!(action.method, Method::Patch);
        assert_eq!(action.data, Some(json!({"name": "x"})));
    }

    #[test]
    fn test_unsupported_operation() {
        let err = parse_action("Operation: FETCH\nInput: {\"url\": \"a\"}").unwrap_err();
        assert!(matches!(err, AgentError::UnsupportedOperation(op) if op == "FETCH"));
    }

    #[test]
    fn test_unparseable_output() {
        let err = parse_action("I am not sure what to do.").unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_action("Operation: GET\nInput: {\"url\": \"a\",}").unwrap_err();
        assert!(matches!(err, AgentError::MalformedAction { .. }));

        let err = parse_action("Operation: GET\nInput: none").unwrap_err();
        assert!(matches!(err, AgentError::MalformedAction { .. }));

        // Valid JSON but no url
        let err = parse_action("Operation: GET\nInput: {\"params\": {}}").unwrap_err();
        assert!(matches!(err, AgentError::MalformedAction { .. }));
    }

    #[test]
    fn test_extract_json_block() {
        assert_eq!(extract_json_block("  `{\"a\": {\"b\": 1}}` trailing").unwrap(), "{\"a\": {\"b\": 1}}");
        assert!(extract_json_block("} backwards {").is_err());
    }
}
