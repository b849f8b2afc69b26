//! Wire types for the completion and model-listing endpoints.

use serde::{Deserialize, Serialize};

/// A chat completion request (OpenAI-compatible format).
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    /// Build the single instruction-plus-context message a transform sends:
    /// the prompt text, a blank line, then the user's text.
    pub fn transform(model: &str, instruction: &str, text: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![Message {
                role: Role::User,
                content: format!("{}\n\n{}", instruction, text),
            }],
            temperature: None,
        }
    }
}

/// A message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

/// A single completion choice.
#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

/// Message part of a choice. Only the content matters here.
#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, or `None` when the service produced
    /// nothing usable (no choices, null content, empty content).
    pub fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
    }
}

/// Response of the model-listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ModelList {
    pub data: Vec<ModelDescriptor>,
}

/// One model offered by the service.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub id: String,
}
