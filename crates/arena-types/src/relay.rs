//! HTTP wire bodies for `POST /api/chat`.

use serde::{Deserialize, Serialize};

use crate::llm::ProviderRequest;

/// Request body accepted by the relay endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequestBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Ask for a streamed text body instead of a single JSON reply.
    #[serde(default)]
    pub stream: bool,
}

impl RelayRequestBody {
    pub fn to_provider_request(&self) -> ProviderRequest {
        ProviderRequest {
            provider: self.provider.clone(),
            model: self.model.clone(),
            message: self.message.clone(),
        }
    }
}

/// Non-streaming success body: `{ "response": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyBody {
    pub response: String,
}

/// Error body: `{ "error": "..." }`, optionally naming the rejected provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            provider: None,
        }
    }
}
