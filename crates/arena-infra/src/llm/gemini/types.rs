//! Gemini `generateContent` wire types.

use serde::Serialize;

/// Request body for `models/{model}:generateContent` and its streaming twin.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<GeminiContent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeminiContent {
    pub role: &'static str,
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeminiPart {
    pub text: String,
}

impl GenerateContentRequest {
    pub fn single_turn(message: &str) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart {
                    text: message.to_string(),
                }],
            }],
        }
    }
}
