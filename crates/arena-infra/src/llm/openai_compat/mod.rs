//! OpenAiCompatAdapter -- [`ProviderAdapter`] for the Chat Completions protocol.
//!
//! Serves both the hosted OpenAI API and self-hosted model servers that
//! expose an OpenAI-compatible `/v1/chat/completions` endpoint (the `local`
//! provider). The only differences are the base URL and whether a bearer
//! token is attached.

pub mod types;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use arena_core::llm::adapter::{ProviderAdapter, StreamSignal, parse_event_json, text_at};
use arena_types::error::UpstreamCause;
use arena_types::llm::{Param, ProviderKind, UpstreamRequest};

use self::types::ChatCompletionRequest;

/// Adapter for OpenAI and OpenAI-compatible endpoints.
///
/// The API key, when present, is only exposed while the transport writes
/// the `Authorization` header.
pub struct OpenAiCompatAdapter {
    kind: ProviderKind,
    api_key: Option<SecretString>,
    base_url: String,
    default_model: String,
}

impl OpenAiCompatAdapter {
    /// Hosted OpenAI API at its public base URL.
    pub fn openai(api_key: SecretString, default_model: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            api_key: Some(api_key),
            base_url: ProviderKind::OpenAi.default_base_url().to_string(),
            default_model: default_model.into(),
        }
    }

    /// Self-hosted model server. The key is optional.
    pub fn local(api_key: Option<SecretString>, default_model: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::Local,
            api_key,
            base_url: ProviderKind::Local.default_base_url().to_string(),
            default_model: default_model.into(),
        }
    }

    /// Override the base URL (proxies, alternative hosts, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl ProviderAdapter for OpenAiCompatAdapter {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn build_request(&self, model: &str, message: &str, stream: bool) -> UpstreamRequest {
        let body = ChatCompletionRequest::single_turn(model, message, stream);
        let body = serde_json::to_value(body).unwrap_or(Value::Null);

        let request = UpstreamRequest::new(self.kind, self.endpoint(), body);
        match &self.api_key {
            Some(key) => request.header(
                "authorization",
                Param::Secret(format!("Bearer {}", key.expose_secret()).into()),
            ),
            None => request,
        }
    }

    fn reply_pointer(&self) -> &'static str {
        "/choices/0/message/content"
    }

    fn interpret_event(&self, _event: &str, data: &str) -> Result<StreamSignal, UpstreamCause> {
        let data = data.trim();
        if data == "[DONE]" {
            return Ok(StreamSignal::Done);
        }
        if data.is_empty() {
            return Ok(StreamSignal::Skip);
        }

        let payload = parse_event_json(data)?;
        if let Some(err) = payload.get("error") {
            let message = text_at(err, "/message").unwrap_or_else(|| err.to_string());
            return Err(UpstreamCause::Stream(message));
        }

        Ok(match text_at(&payload, "/choices/0/delta/content") {
            Some(text) => StreamSignal::Text(text),
            None => StreamSignal::Skip,
        })
    }
}
