//! GeminiAdapter -- [`ProviderAdapter`] for the Google Generative Language API.
//!
//! The model is part of the URL path and the API key travels as the `key`
//! query parameter. Streaming uses `:streamGenerateContent?alt=sse`, where
//! every event is a partial `GenerateContentResponse` and the stream simply
//! ends with the body.

pub mod types;

use secrecy::SecretString;
use serde_json::Value;

use arena_core::llm::adapter::{ProviderAdapter, StreamSignal, parse_event_json, text_at};
use arena_types::error::UpstreamCause;
use arena_types::llm::{Param, ProviderKind, UpstreamRequest};

use self::types::GenerateContentRequest;

const REPLY_POINTER: &str = "/candidates/0/content/parts/0/text";

pub struct GeminiAdapter {
    api_key: SecretString,
    base_url: String,
    default_model: String,
}

impl GeminiAdapter {
    pub fn new(api_key: SecretString, default_model: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: ProviderKind::Gemini.default_base_url().to_string(),
            default_model: default_model.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl ProviderAdapter for GeminiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn build_request(&self, model: &str, message: &str, stream: bool) -> UpstreamRequest {
        let method = if stream {
            "streamGenerateContent"
        } else {
            "generateContent"
        };
        let url = format!(
            "{}/v1beta/models/{model}:{method}",
            self.base_url.trim_end_matches('/')
        );
        let body = serde_json::to_value(GenerateContentRequest::single_turn(message)).unwrap_or(Value::Null);

        let request = UpstreamRequest::new(ProviderKind::Gemini, url, body);
        let request = if stream {
            request.query("alt", Param::plain("sse"))
        } else {
            request
        };
        request.query("key", Param::Secret(self.api_key.clone()))
    }

    fn reply_pointer(&self) -> &'static str {
        REPLY_POINTER
    }

    fn interpret_event(&self, _event: &str, data: &str) -> Result<StreamSignal, UpstreamCause> {
        if data.trim().is_empty() {
            return Ok(StreamSignal::Skip);
        }
        let payload = parse_event_json(data)?;
        if let Some(err) = payload.get("error") {
            let message = text_at(err, "/message").unwrap_or_else(|| err.to_string());
            return Err(UpstreamCause::Stream(message));
        }
        Ok(match text_at(&payload, REPLY_POINTER) {
            Some(text) => StreamSignal::Text(text),
            None => StreamSignal::Skip,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn adapter() -> GeminiAdapter {
        GeminiAdapter::new(SecretString::from("gm-test"), "gemini-1.5-flash")
    }

    #[test]
    fn test_build_request_non_streaming() {
        let request = adapter().build_request("gemini-1.5-pro", "Hello", false);

        assert_eq!(
            request.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
        assert_eq!(request.query_value("key"), Some("gm-test"));
        assert!(request.query_value("alt").is_none());
        assert_eq!(
            request.body,
            json!({ "contents": [{ "role": "user", "parts": [{ "text": "Hello" }] }] })
        );
        assert!(!format!("{request:?}").contains("gm-test"));
    }

    #[test]
    fn test_build_request_streaming() {
        let request = adapter().build_request("gemini-1.5-flash", "Hello", true);
        assert!(request.url.ends_with("/v1beta/models/gemini-1.5-flash:streamGenerateContent"));
        assert_eq!(request.query_value("alt"), Some("sse"));
        assert_eq!(request.query_value("key"), Some("gm-test"));
    }

    #[test]
    fn test_extract_reply() {
        let body = json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": "hello" }] } }]
        });
        assert_eq!(adapter().extract_reply(&body).as_deref(), Some("hello"));
        assert!(adapter().extract_reply(&json!({ "candidates": [] })).is_none());
    }

    #[test]
    fn test_interpret_stream_events() {
        let adapter = adapter();
        let chunk = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hel"}]}}]}"#;
        assert_eq!(adapter.interpret_event("message", chunk).unwrap(), StreamSignal::Text("Hel".into()));

        let usage_only = r#"{"usageMetadata":{"totalTokenCount":5}}"#;
        assert_eq!(adapter.interpret_event("message", usage_only).unwrap(), StreamSignal::Skip);

        let err = adapter
            .interpret_event("message", r#"{"error":{"code":400,"message":"API key not valid"}}"#)
            .unwrap_err();
        assert!(matches!(err, UpstreamCause::Stream(m) if m == "API key not valid"));
    }
}
