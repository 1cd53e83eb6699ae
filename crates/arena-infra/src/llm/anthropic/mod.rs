//! AnthropicAdapter -- [`ProviderAdapter`] for the Anthropic Messages API.
//!
//! Requests go to `/v1/messages` with the `x-api-key` and
//! `anthropic-version` headers. Non-streaming replies carry the text in the
//! first content block; streaming replies deliver it in
//! `content_block_delta` events and end with `message_stop`.

pub mod types;

use secrecy::SecretString;
use serde_json::Value;

use arena_core::llm::adapter::{ProviderAdapter, StreamSignal};
use arena_types::error::UpstreamCause;
use arena_types::llm::{Param, ProviderKind, UpstreamRequest};

use self::types::{AnthropicDelta, AnthropicMessage, AnthropicRequest, ContentBlockDeltaPayload, ErrorPayload};

/// Anthropic Claude adapter.
///
/// The API key is stored as a [`SecretString`] and only exposed when the
/// transport writes the request headers.
pub struct AnthropicAdapter {
    api_key: SecretString,
    base_url: String,
    default_model: String,
}

impl AnthropicAdapter {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    /// Output token cap for a single reply.
    const MAX_TOKENS: u32 = 1024;

    pub fn new(api_key: SecretString, default_model: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: ProviderKind::Anthropic.default_base_url().to_string(),
            default_model: default_model.into(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl ProviderAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn build_request(&self, model: &str, message: &str, stream: bool) -> UpstreamRequest {
        let body = AnthropicRequest {
            model: model.to_string(),
            max_tokens: Self::MAX_TOKENS,
            messages: vec![AnthropicMessage {
                role: "user",
                content: message.to_string(),
            }],
            stream,
        };
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));

        UpstreamRequest::new(
            ProviderKind::Anthropic,
            url,
            serde_json::to_value(body).unwrap_or(Value::Null),
        )
        .header("x-api-key", Param::Secret(self.api_key.clone()))
        .header("anthropic-version", Param::plain(Self::API_VERSION))
    }

    fn reply_pointer(&self) -> &'static str {
        "/content/0/text"
    }

    fn interpret_event(&self, event: &str, data: &str) -> Result<StreamSignal, UpstreamCause> {
        match event {
            "content_block_delta" => {
                let payload: ContentBlockDeltaPayload = serde_json::from_str(data).map_err(|e| {
                    UpstreamCause::Malformed(format!("invalid content_block_delta payload: {e}"))
                })?;
                Ok(match payload.delta {
                    AnthropicDelta::TextDelta { text } => StreamSignal::Text(text),
                    AnthropicDelta::Other => StreamSignal::Skip,
                })
            }
            "message_stop" => Ok(StreamSignal::Done),
            "error" => {
                let message = match serde_json::from_str::<ErrorPayload>(data) {
                    Ok(payload) => format!("{}: {}", payload.error.error_type, payload.error.message),
                    Err(_) => data.to_string(),
                };
                Err(UpstreamCause::Stream(message))
            }
            // message_start, content_block_start/stop, message_delta, ping
            _ => Ok(StreamSignal::Skip),
        }
    }
}
