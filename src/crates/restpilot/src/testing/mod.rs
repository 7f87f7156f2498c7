//! Test infrastructure and helpers
//!
//! - [`ScriptedModel`]: a [`ChatModel`] that replays queued completions and
//!   records every request it receives
//! - [`fixtures`]: small TMDB and Spotify API descriptions

pub mod fixtures;

use async_trait::async_trait;
use llm::{ChatModel, ChatRequest, ChatResponse, LlmError};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Completion service stand-in that answers from a script.
///
/// Responses are returned in order, one per `chat` call. Once the script is
/// exhausted every further call fails with a provider error.
///
/// ```rust,ignore
/// let model = Arc::new(ScriptedModel::new([
///     "Get the id of Akira Kurosawa",
///     "Final Answer: Seven Samurai",
/// ]));
/// ```
#[derive(Debug, Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue one more completion.
    pub fn push(&self, response: impl Into<String>) {
        self.responses.lock().push_back(response.into());
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }

    /// Prompt text of every request, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .map(|r| {
                r.messages
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Completions not consumed yet.
    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, request: ChatRequest) -> llm::Result<ChatResponse> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .map(ChatResponse::from_text)
            .ok_or_else(|| LlmError::ProviderError("scripted model has no more responses".to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm::Message;

    #[tokio::test]
    async fn test_scripted_model_replays_in_order() {
        let model = ScriptedModel::new(["first", "second"]);

        let r1 = model.chat(ChatRequest::new(vec![Message::human("a")])).await.unwrap();
        let r2 = model.chat(ChatRequest::new(vec![Message::human("b")])).await.unwrap();

        assert_eq!(r1.text(), "first");
        assert_eq!(r2.text(), "second");
        assert_eq!(model.prompts(), vec!["a", "b"]);
        assert!(model.chat(ChatRequest::new(vec![])).await.is_err());
        assert_eq!(model.call_count(), 3);
    }
}
