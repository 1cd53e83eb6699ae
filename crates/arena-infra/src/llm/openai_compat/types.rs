//! Chat Completions wire types shared by OpenAI and OpenAI-compatible servers.

use serde::Serialize;

/// Request body for `POST /v1/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatCompletionMessage>,
    pub stream: bool,
}

/// A single message in a chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatCompletionRequest {
    /// Single-turn request: one user message, no history.
    pub fn single_turn(model: &str, message: &str, stream: bool) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatCompletionMessage {
                role: "user",
                content: message.to_string(),
            }],
            stream,
        }
    }
}
