use thiserror::Error;

use crate::llm::ProviderKind;

/// Errors from the provider relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The caller named a provider outside the supported (or enabled) set.
    #[error("unsupported provider: '{0}'")]
    UnsupportedProvider(String),

    /// The upstream provider could not be reached or answered badly.
    #[error("{provider} upstream request failed: {cause}")]
    Upstream {
        provider: ProviderKind,
        #[source]
        cause: UpstreamCause,
    },
}

impl RelayError {
    pub fn upstream(provider: ProviderKind, cause: UpstreamCause) -> Self {
        RelayError::Upstream { provider, cause }
    }
}

/// Underlying reason for an upstream failure.
#[derive(Debug, Error)]
pub enum UpstreamCause {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Malformed(String),

    #[error("stream interrupted: {0}")]
    Stream(String),
}

/// Errors raised while loading configuration or resolving credentials.
///
/// All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("{provider} is enabled but {env_var} is not set")]
    MissingCredential {
        provider: ProviderKind,
        env_var: String,
    },

    #[error("no providers are enabled")]
    NoProvidersEnabled,
}

/// Errors seen by the chat client while talking to the relay endpoint.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay could not be reached, or the body read failed mid-way.
    #[error("network error: {0}")]
    Network(String),

    /// The relay answered with an `{ "error": ... }` body.
    #[error("relay rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The relay answered with a body the client could not interpret.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// An invalid UTF-8 sequence in a streamed response body.
///
/// Never fatal: the decoder substitutes U+FFFD and records the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid UTF-8 sequence of {len} byte(s) at stream offset {offset}")]
pub struct DecodeError {
    pub offset: usize,
    pub len: usize,
}
