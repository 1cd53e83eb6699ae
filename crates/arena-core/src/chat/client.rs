//! RelayClient trait -- how the chat session reaches the relay endpoint.

use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use arena_types::error::ClientError;
use arena_types::relay::RelayRequestBody;

/// Raw response body chunks, in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, ClientError>> + Send + 'static>>;

/// A successful relay answer: either the whole reply at once, or a body that
/// has to be read incrementally.
pub enum RelayReply {
    Whole(String),
    Streamed(ChunkStream),
}

impl std::fmt::Debug for RelayReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayReply::Whole(text) => f.debug_tuple("Whole").field(text).finish(),
            RelayReply::Streamed(_) => f.write_str("Streamed(..)"),
        }
    }
}

/// Sends one message to the relay endpoint.
///
/// Implementations live in `arena-infra` (HTTP via reqwest); tests use fakes.
pub trait RelayClient: Send + Sync {
    fn send(
        &self,
        body: RelayRequestBody,
    ) -> impl std::future::Future<Output = Result<RelayReply, ClientError>> + Send;
}
