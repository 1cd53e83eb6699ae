//! Relay chat endpoint.
//!
//! POST /api/chat
//!
//! Body: `{ "message": "...", "model"?: "...", "provider"?: "...", "stream"?: bool }`.
//!
//! - `stream: false` (default): `200 { "response": "..." }`
//! - `stream: true`: `200 text/plain; charset=utf-8`, reply text written as
//!   it arrives. A failure after the first fragment cannot change the status
//!   any more; it is logged and the body is cut short.
//! - Unsupported provider: `400 { "error": "Unsupported provider.", "provider": "..." }`
//! - Upstream failure before any output: `500 { "error": "Failed to contact <Provider> API." }`

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;
use uuid::Uuid;

use arena_core::llm::transport::UpstreamTransport;
use arena_types::relay::{RelayRequestBody, ReplyBody};

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /api/chat -- relay one message to the selected provider.
pub async fn relay_chat<T: UpstreamTransport + 'static>(
    State(state): State<AppState<T>>,
    payload: Result<Json<RelayRequestBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    if body.message.trim().is_empty() {
        return Err(AppError::Validation("Message must not be empty.".to_string()));
    }

    let request = body.to_provider_request();
    let request_id = Uuid::now_v7();
    tracing::info!(
        %request_id,
        provider = request.provider.as_deref().unwrap_or("-"),
        model = request.model.as_deref().unwrap_or("-"),
        stream = body.stream,
        "chat request"
    );

    if !body.stream {
        let reply = state.relay.complete(&request).await?;
        return Ok(Json(ReplyBody { response: reply }).into_response());
    }

    let fragments = state.relay.stream(&request).await?.inspect_err(move |err| {
        tracing::error!(%request_id, error = %err, "reply stream aborted");
    });

    Ok((
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(fragments),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::http::{Request, StatusCode};
    use bytes::Bytes;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use arena_core::llm::relay::ProviderRelay;
    use arena_core::llm::transport::UpstreamResponse;
    use arena_infra::llm::anthropic::AnthropicAdapter;
    use arena_infra::llm::openai_compat::OpenAiCompatAdapter;
    use arena_types::error::UpstreamCause;
    use arena_types::llm::UpstreamRequest;

    use super::*;
    use crate::http::router::build_router;

    type Replay = Box<dyn Fn() -> Result<UpstreamResponse, UpstreamCause> + Send + Sync>;

    /// Records every upstream call and replays a canned response.
    struct FakeTransport {
        replay: Replay,
        calls: Mutex<Vec<UpstreamRequest>>,
    }

    impl FakeTransport {
        fn new(replay: Replay) -> Self {
            Self {
                replay,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn ok(body: &'static str) -> Self {
            Self::chunks(200, vec![body])
        }

        fn chunks(status: u16, chunks: Vec<&'static str>) -> Self {
            Self::new(Box::new(move || {
                let items: Vec<Result<Bytes, UpstreamCause>> =
                    chunks.iter().map(|c| Ok(Bytes::from_static(c.as_bytes()))).collect();
                Ok(UpstreamResponse {
                    status,
                    body: Box::pin(futures_util::stream::iter(items)),
                })
            }))
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl UpstreamTransport for FakeTransport {
        async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamCause> {
            self.calls.lock().unwrap().push(request);
            (self.replay)()
        }
    }

    fn app_state(transport: FakeTransport) -> AppState<FakeTransport> {
        let relay = ProviderRelay::new(transport)
            .with_adapter(OpenAiCompatAdapter::openai("sk-test".into(), "gpt-3.5-turbo"))
            .with_adapter(AnthropicAdapter::new("sk-ant-test".into(), "claude-3-haiku-20240307"));
        AppState::new(relay)
    }

    async fn post_chat(state: AppState<FakeTransport>, body: Value) -> (StatusCode, String, Bytes) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, bytes)
    }

    fn json_body(bytes: &Bytes) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_openai_reply() {
        let state = app_state(FakeTransport::ok(r#"{"choices":[{"message":{"content":"hello"}}]}"#));
        let relay = state.relay.clone();

        let (status, _, body) = post_chat(state, json!({ "message": "hi", "provider": "openai" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body), json!({ "response": "hello" }));
        assert_eq!(relay.transport().call_count(), 1);
    }

    #[tokio::test]
    async fn test_anthropic_reply() {
        let state = app_state(FakeTransport::ok(r#"{"content":[{"text":"hi there"}]}"#));

        let (status, _, body) = post_chat(state, json!({ "message": "hi", "provider": "anthropic" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body), json!({ "response": "hi there" }));
    }

    #[tokio::test]
    async fn test_unsupported_provider_is_rejected_without_upstream_call() {
        let state = app_state(FakeTransport::ok("{}"));
        let relay = state.relay.clone();

        let (status, _, body) =
            post_chat(state, json!({ "message": "hi", "provider": "carrierpigeon" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = json_body(&body);
        assert_eq!(body["error"], "Unsupported provider.");
        assert_eq!(body["provider"], "carrierpigeon");
        assert_eq!(relay.transport().call_count(), 0);
    }

    #[tokio::test]
    async fn test_network_error_names_provider() {
        let state = app_state(FakeTransport::new(Box::new(|| {
            Err(UpstreamCause::Network("connection refused".into()))
        })));
        let relay = state.relay.clone();

        let (status, _, body) = post_chat(state, json!({ "message": "hi", "provider": "openai" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(&body), json!({ "error": "Failed to contact OpenAI API." }));
        assert_eq!(relay.transport().call_count(), 1);
    }

    #[tokio::test]
    async fn test_upstream_status_error_hides_cause() {
        let state = app_state(FakeTransport::chunks(401, vec![r#"{"error":{"message":"bad key sk-ant-test"}}"#]));

        let (status, _, body) = post_chat(state, json!({ "message": "hi", "provider": "anthropic" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(&body), json!({ "error": "Failed to contact Anthropic API." }));
    }

    #[tokio::test]
    async fn test_defaults_to_openai_and_its_default_model() {
        let state = app_state(FakeTransport::ok(r#"{"choices":[{"message":{"content":"ok"}}]}"#));
        let relay = state.relay.clone();

        let (status, _, _) = post_chat(state, json!({ "message": "hi" })).await;

        assert_eq!(status, StatusCode::OK);
        let calls = relay.transport().calls.lock().unwrap();
        assert_eq!(calls[0].url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(calls[0].body["model"], "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn test_missing_reply_text_uses_fallback() {
        let state = app_state(FakeTransport::ok(r#"{"choices":[]}"#));

        let (_, _, body) = post_chat(state, json!({ "message": "hi" })).await;

        assert_eq!(json_body(&body), json!({ "response": "No response from provider." }));
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let state = app_state(FakeTransport::ok("{}"));
        let relay = state.relay.clone();

        let (status, _, body) = post_chat(state, json!({ "message": "   " })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_body(&body)["error"].is_string());
        assert_eq!(relay.transport().call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_message_is_rejected() {
        let state = app_state(FakeTransport::ok("{}"));

        let (status, _, body) = post_chat(state, json!({ "model": "gpt-4" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_body(&body)["error"].is_string());
    }

    #[tokio::test]
    async fn test_streamed_reply_is_plain_text() {
        let state = app_state(FakeTransport::chunks(
            200,
            vec![
                "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"lo, \"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"con",
                "tent\":\"world\"}}]}\n\ndata: [DONE]\n\n",
            ],
        ));
        let relay = state.relay.clone();

        let (status, content_type, body) =
            post_chat(state, json!({ "message": "hi", "provider": "openai", "stream": true })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "text/plain; charset=utf-8");
        assert_eq!(body, Bytes::from_static(b"Hello, world"));
        assert_eq!(relay.transport().calls.lock().unwrap()[0].body["stream"], true);
    }

    #[tokio::test]
    async fn test_stream_rejected_before_first_byte_is_json_error() {
        let state = app_state(FakeTransport::chunks(503, vec!["overloaded"]));

        let (status, content_type, body) =
            post_chat(state, json!({ "message": "hi", "provider": "anthropic", "stream": true })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(content_type.starts_with("application/json"));
        assert_eq!(json_body(&body), json!({ "error": "Failed to contact Anthropic API." }));
    }

    #[tokio::test]
    async fn test_failure_after_first_fragment_cuts_body_short() {
        let state = app_state(FakeTransport::new(Box::new(|| {
            let items: Vec<Result<Bytes, UpstreamCause>> = vec![
                Ok(Bytes::from_static(
                    b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
                )),
                Err(UpstreamCause::Network("connection reset".into())),
            ];
            Ok(UpstreamResponse {
                status: 200,
                body: Box::pin(futures_util::stream::iter(items)),
            })
        })));
        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "message": "hi", "provider": "openai", "stream": true }).to_string(),
            ))
            .unwrap();

        let response = build_router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.into_body().collect().await.is_err());
    }

    #[tokio::test]
    async fn test_health() {
        let state = app_state(FakeTransport::ok("{}"));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = build_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(json_body(&body)["status"], "ok");
    }
}
