//! ReqwestTransport -- the production [`UpstreamTransport`].
//!
//! Sends one POST per [`UpstreamRequest`] and hands the body back as a lazy
//! byte stream. Nothing is retried. Error messages are stripped of the
//! request URL because some providers carry the API key in the query.

use std::time::Duration;

use futures_util::StreamExt;

use arena_core::llm::transport::{UpstreamResponse, UpstreamTransport};
use arena_types::error::UpstreamCause;
use arena_types::llm::UpstreamRequest;

/// Generous enough for long generations.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client })
    }
}

impl UpstreamTransport for ReqwestTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamCause> {
        let mut builder = self.client.post(&request.url);

        if !request.query.is_empty() {
            let pairs: Vec<(&str, &str)> = request
                .query
                .iter()
                .map(|(name, value)| (*name, value.expose()))
                .collect();
            builder = builder.query(&pairs);
        }
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.expose());
        }

        let response = builder
            .json(&request.body)
            .send()
            .await
            .map_err(|e| UpstreamCause::Network(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        tracing::debug!(provider = %request.provider, status, "upstream responded");

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| UpstreamCause::Stream(e.without_url().to_string())));

        Ok(UpstreamResponse {
            status,
            body: Box::pin(body),
        })
    }
}
