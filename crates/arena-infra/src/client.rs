//! HttpRelayClient -- [`RelayClient`] that talks to a running relay over HTTP.
//!
//! Posts the request body to `{base}/api/chat`. A JSON success body becomes
//! [`RelayReply::Whole`]; any other success body is handed back as a chunk
//! stream for incremental decoding. Error statuses carrying an `{error}`
//! body become [`ClientError::Rejected`].

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;

use arena_core::chat::client::{RelayClient, RelayReply};
use arena_types::error::ClientError;
use arena_types::relay::{ErrorBody, RelayRequestBody, ReplyBody};

pub struct HttpRelayClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRelayClient {
    /// Client for the relay served at `base_url` (e.g. `http://127.0.0.1:3000`).
    ///
    /// No overall timeout: streamed replies may take minutes.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RelayClient for HttpRelayClient {
    async fn send(&self, body: RelayRequestBody) -> Result<RelayReply, ClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.to_ascii_lowercase().starts_with("application/json"));

        if !status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| ClientError::Network(e.to_string()))?;
            return match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => Err(ClientError::Rejected {
                    status: status.as_u16(),
                    message: body.error,
                }),
                Err(_) => Err(ClientError::UnexpectedResponse(format!(
                    "HTTP {status} without an error body"
                ))),
            };
        }

        if is_json {
            let reply: ReplyBody = response
                .json()
                .await
                .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;
            return Ok(RelayReply::Whole(reply.response));
        }

        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| ClientError::Network(e.to_string())));
        Ok(RelayReply::Streamed(Box::pin(chunks)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::Json;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::http::header::CONTENT_TYPE;
    use axum::routing::post;
    use futures_util::TryStreamExt;
    use serde_json::Value;
    use tokio::net::TcpListener;

    use super::*;

    type Received = Arc<Mutex<Vec<Value>>>;

    /// Serve a relay endpoint that always answers with the given response.
    /// Returns the base URL and the request bodies it receives.
    async fn serve(status: u16, content_type: &'static str, body: &'static str) -> (String, Received) {
        let received: Received = Arc::default();
        let status = StatusCode::from_u16(status).unwrap();

        let app = Router::new().route(
            "/api/chat",
            post({
                let received = received.clone();
                move |Json(request): Json<Value>| async move {
                    received.lock().unwrap().push(request);
                    (status, [(CONTENT_TYPE, content_type)], body)
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), received)
    }

    #[tokio::test]
    async fn test_json_reply_is_whole() {
        let (base, received) = serve(200, "application/json", r#"{"response":"hello"}"#).await;
        let client = HttpRelayClient::new(&base).unwrap();

        let reply = client
            .send(RelayRequestBody {
                message: "hi".into(),
                model: Some("gpt-4".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(matches!(reply, RelayReply::Whole(ref text) if text == "hello"));

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["message"], "hi");
        assert_eq!(received[0]["model"], "gpt-4");
    }

    #[tokio::test]
    async fn test_text_reply_is_streamed() {
        let (base, received) = serve(200, "text/plain; charset=utf-8", "Hello, world").await;
        let client = HttpRelayClient::new(&base).unwrap();

        let reply = client.send(RelayRequestBody { message: "hi".into(), stream: true, ..Default::default() }).await.unwrap();
        let RelayReply::Streamed(chunks) = reply else {
            panic!("expected a streamed reply");
        };
        let bytes: Vec<u8> = chunks
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
            .unwrap();
        assert_eq!(bytes, b"Hello, world");
        assert_eq!(received.lock().unwrap()[0]["stream"], true);
    }

    #[tokio::test]
    async fn test_error_body_is_rejected() {
        let (base, _) = serve(
            400,
            "application/json",
            r#"{"error":"Unsupported provider.","provider":"cohere"}"#,
        )
        .await;
        let client = HttpRelayClient::new(&base).unwrap();

        let err = client.send(RelayRequestBody { message: "hi".into(), ..Default::default() }).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Rejected { status: 400, ref message } if message == "Unsupported provider."
        ));
    }

    #[tokio::test]
    async fn test_error_status_without_body_is_unexpected() {
        let (base, _) = serve(502, "text/html", "<html></html>").await;
        let client = HttpRelayClient::new(&base).unwrap();

        let err = client.send(RelayRequestBody { message: "hi".into(), ..Default::default() }).await.unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpRelayClient::new(&format!("http://{addr}/")).unwrap();
        assert_eq!(client.endpoint(), format!("http://{addr}/api/chat"));

        let err = client.send(RelayRequestBody { message: "hi".into(), ..Default::default() }).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}
