//! Completion collaborator adapter
//!
//! Every stage talks to the model the same way: one prompt in, one text out,
//! with stop sequences that keep the model from writing the next observation
//! itself.

use crate::error::Result;
use llm::{ChatModel, ChatRequest, Message};
use std::sync::Arc;

/// Sampling settings shared by all stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionSettings {
    pub temperature: f32,
    pub max_tokens: Option<usize>,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: None,
        }
    }
}

/// A model handle plus the settings each request is sent with.
#[derive(Clone)]
pub struct Completer {
    model: Arc<dyn ChatModel>,
    settings: CompletionSettings,
}

impl std::fmt::Debug for Completer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completer")
            .field("model", &self.model.model_name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Completer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            settings: CompletionSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CompletionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn model(&self) -> &Arc<dyn ChatModel> {
        &self.model
    }

    /// Complete `prompt`, halting at any of `stop`.
    pub async fn complete(&self, prompt: &str, stop: &[&str]) -> Result<String> {
        complete(self.model.as_ref(), prompt, stop, &self.settings).await
    }
}

/// Send `prompt` as a single user message and return the generated text.
pub async fn complete(
    model: &dyn ChatModel,
    prompt: &str,
    stop: &[&str],
    settings: &CompletionSettings,
) -> Result<String> {
    let mut request = ChatRequest::new(vec![Message::human(prompt)])
        .with_temperature(settings.temperature)
        .with_stop_sequences(stop.iter().map(|s| s.to_string()).collect());
    if let Some(max_tokens) = settings.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }

    let response = model.chat(request).await?;
    Ok(response.text().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    #[tokio::test]
    async fn test_complete_forwards_stop_and_settings() {
        let model = Arc::new(ScriptedModel::new(["Operation: GET"]));
        let completer = Completer::new(model.clone()).with_settings(CompletionSettings {
            temperature: 0.2,
            max_tokens: Some(256),
        });

        let text = completer
            .complete("Plan: get movies", &["\nObservation:", "\n\tObservation:"])
            .await
            .unwrap();

        assert_eq!(text, "Operation: GET");
        let request = &model.requests()[0];
        assert_eq!(request.config.temperature, Some(0.2));
        assert_eq!(request.config.max_tokens, Some(256));
        assert_eq!(
            request.config.stop_sequences,
            vec!["\nObservation:".to_string(), "\n\tObservation:".to_string()]
        );
    }
}
