//! UpstreamTransport trait definition.
//!
//! The single network seam of the relay. Production uses the reqwest
//! transport from `arena-infra`; tests substitute a recording fake.

use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use arena_types::error::UpstreamCause;
use arena_types::llm::UpstreamRequest;

/// Response body as a lazy, finite, non-restartable sequence of byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, UpstreamCause>> + Send + 'static>>;

/// Status line plus streaming body of an upstream response.
pub struct UpstreamResponse {
    pub status: u16,
    pub body: ByteStream,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Drain the body into memory.
    pub async fn collect(self) -> Result<Vec<u8>, UpstreamCause> {
        let mut body = self.body;
        let mut buffer = Vec::new();
        while let Some(chunk) = body.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer)
    }
}

impl std::fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Sends [`UpstreamRequest`]s to provider APIs.
///
/// Uses native async fn in traits (RPITIT). Implementations must not retry:
/// every failure is surfaced to the caller exactly once.
pub trait UpstreamTransport: Send + Sync {
    /// Issue the request and return as soon as the status line is available.
    fn send(
        &self,
        request: UpstreamRequest,
    ) -> impl std::future::Future<Output = Result<UpstreamResponse, UpstreamCause>> + Send;
}
