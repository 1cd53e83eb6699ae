//! ProviderAdapter trait definition.
//!
//! Each upstream vendor gets one adapter. An adapter never touches the
//! network: it turns (model, message) into an [`UpstreamRequest`] and knows
//! where the reply text lives in the vendor's JSON. Adding a provider means
//! adding an adapter, not editing a shared branch.

use serde_json::Value;

use arena_types::error::UpstreamCause;
use arena_types::llm::{ProviderKind, UpstreamRequest};

/// What one server-sent event from a streaming upstream means for the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSignal {
    /// A fragment of reply text.
    Text(String),
    /// Keep-alive, metadata, or any event without reply text.
    Skip,
    /// The upstream signalled the end of the reply.
    Done,
}

/// Trait for upstream LLM vendors (OpenAI, Anthropic, Gemini, local).
///
/// Object-safe so the relay can hold a heterogeneous set of adapters.
/// Implementations live in `arena-infra`.
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this adapter speaks to.
    fn kind(&self) -> ProviderKind;

    /// Model used when the caller does not supply one.
    fn default_model(&self) -> &str;

    /// Build the outbound request for a single-turn chat.
    ///
    /// Pure: depends only on the arguments and the adapter's static config.
    fn build_request(&self, model: &str, message: &str, stream: bool) -> UpstreamRequest;

    /// JSON pointer to the reply text in a non-streaming response body.
    fn reply_pointer(&self) -> &'static str;

    /// Extract the reply text from a non-streaming response body.
    ///
    /// `None` means the body had no usable text; the relay substitutes the
    /// fallback reply.
    fn extract_reply(&self, body: &Value) -> Option<String> {
        text_at(body, self.reply_pointer())
    }

    /// Interpret one server-sent event (`event:` name and raw `data:` payload).
    fn interpret_event(&self, event: &str, data: &str) -> Result<StreamSignal, UpstreamCause>;
}

/// Non-empty string at a JSON pointer, if any.
pub fn text_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse an event payload as JSON, mapping failures to [`UpstreamCause::Malformed`].
pub fn parse_event_json(data: &str) -> Result<Value, UpstreamCause> {
    serde_json::from_str(data)
        .map_err(|e| UpstreamCause::Malformed(format!("invalid stream event payload: {e}")))
}
