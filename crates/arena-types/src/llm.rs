//! Provider request types for the relay.
//!
//! These types describe *what* the relay asks of an upstream LLM vendor:
//! which provider, which model, which single user message, and the concrete
//! HTTP request an adapter builds for it.

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Reply text used when a provider answers without any extractable text.
pub const NO_RESPONSE_FALLBACK: &str = "No response from provider.";

/// The statically known set of upstream providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Gemini,
    /// Self-hosted model served through an OpenAI-compatible endpoint.
    Local,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::Gemini,
        ProviderKind::Local,
    ];

    /// Lowercase identifier used on the wire and in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Local => "local",
        }
    }

    /// Vendor name shown to end users (e.g. in "Failed to contact OpenAI API.").
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Anthropic => "Anthropic",
            ProviderKind::Gemini => "Gemini",
            ProviderKind::Local => "local model",
        }
    }

    /// Guess the provider that serves a model name.
    ///
    /// Used when a caller supplies a model but no provider.
    pub fn infer_from_model(model: &str) -> Self {
        let model = model.trim().to_lowercase();
        if model.starts_with("claude") {
            ProviderKind::Anthropic
        } else if model.starts_with("gemini") {
            ProviderKind::Gemini
        } else if model.starts_with("mistral") || model.starts_with("llama") {
            ProviderKind::Local
        } else {
            ProviderKind::OpenAi
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "gemini" => Ok(ProviderKind::Gemini),
            "local" => Ok(ProviderKind::Local),
            other => Err(format!("invalid provider: '{other}'")),
        }
    }
}

/// One relay call: a single user message for one provider/model.
///
/// `provider` and `model` are the raw caller values; the relay resolves
/// defaults and rejects unknown providers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub message: String,
}

impl ProviderRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// A header or query value in an [`UpstreamRequest`].
///
/// Secret values print as `[REDACTED]` in `Debug` output.
#[derive(Clone)]
pub enum Param {
    Plain(String),
    Secret(SecretString),
}

impl Param {
    pub fn plain(value: impl Into<String>) -> Self {
        Param::Plain(value.into())
    }

    /// The raw value, for writing onto the wire.
    pub fn expose(&self) -> &str {
        match self {
            Param::Plain(value) => value,
            Param::Secret(secret) => secret.expose_secret(),
        }
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Plain(value) => write!(f, "{value:?}"),
            Param::Secret(_) => f.write_str("[REDACTED]"),
        }
    }
}

/// A fully described outbound POST to a provider.
///
/// Built by a provider adapter as a pure function of the request and its
/// static configuration; sent by an upstream transport.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub provider: ProviderKind,
    /// Endpoint URL without secret query parameters.
    pub url: String,
    pub query: Vec<(&'static str, Param)>,
    pub headers: Vec<(&'static str, Param)>,
    pub body: serde_json::Value,
}

impl UpstreamRequest {
    pub fn new(provider: ProviderKind, url: String, body: serde_json::Value) -> Self {
        Self {
            provider,
            url,
            query: Vec::new(),
            headers: vec![("content-type", Param::plain("application/json"))],
            body,
        }
    }

    pub fn header(mut self, name: &'static str, value: Param) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn query(mut self, name: &'static str, value: Param) -> Self {
        self.query.push((name, value));
        self
    }

    /// Look up a header value by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.expose())
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.expose())
    }
}
