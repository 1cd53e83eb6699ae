//! Application error type mapping to HTTP status codes and `{error}` bodies.
//!
//! Upstream causes are logged here and never sent to the caller; the body
//! only names the provider that could not be reached.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use arena_types::error::RelayError;
use arena_types::relay::ErrorBody;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Relay errors: unsupported provider or upstream failure.
    Relay(RelayError),
    /// Malformed or incomplete request body.
    Validation(String),
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        AppError::Relay(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Relay(RelayError::UnsupportedProvider(name)) => {
                tracing::warn!(provider = %name, "rejected unsupported provider");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        error: "Unsupported provider.".to_string(),
                        provider: Some(name),
                    },
                )
            }
            AppError::Relay(RelayError::Upstream { provider, cause }) => {
                tracing::error!(provider = %provider, cause = %cause, "upstream request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(format!("Failed to contact {} API.", provider.display_name())),
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg)),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_types::error::UpstreamCause;
    use arena_types::llm::ProviderKind;

    #[test]
    fn test_status_codes() {
        let unsupported = AppError::from(RelayError::UnsupportedProvider("carrierpigeon".into()));
        assert_eq!(unsupported.into_response().status(), StatusCode::BAD_REQUEST);

        let upstream = AppError::from(RelayError::upstream(
            ProviderKind::OpenAi,
            UpstreamCause::Network("connection refused".into()),
        ));
        assert_eq!(upstream.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let invalid = AppError::Validation("Message must not be empty.".into());
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
