//! Server-sent-event normalization for streaming upstream replies.
//!
//! All supported vendors stream as SSE. The framing is parsed here once; the
//! adapter decides what each event means. The output is a stream of plain
//! UTF-8 text fragments in arrival order. Fragment boundaries follow the
//! upstream events, not word or token boundaries.

use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use eventsource_stream::{EventStreamError, Eventsource};
use futures_util::{Stream, StreamExt};

use arena_types::error::{RelayError, UpstreamCause};
use arena_types::llm::NO_RESPONSE_FALLBACK;

use super::adapter::{ProviderAdapter, StreamSignal};
use super::transport::ByteStream;

/// Normalized reply fragments. Concatenated, they form the full reply.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Bytes, RelayError>> + Send + 'static>>;

/// Turn a raw SSE response body into a stream of reply text fragments.
///
/// If the upstream finishes without producing any text, a single
/// [`NO_RESPONSE_FALLBACK`] fragment is emitted so that a successful stream
/// is never empty.
pub fn fragment_stream(adapter: Arc<dyn ProviderAdapter>, body: ByteStream) -> FragmentStream {
    let provider = adapter.kind();

    Box::pin(async_stream::try_stream! {
        let mut events = Box::pin(body.eventsource());
        let mut fragments: usize = 0;

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| RelayError::upstream(provider, sse_cause(e)))?;

            let signal = adapter
                .interpret_event(&event.event, &event.data)
                .map_err(|cause| RelayError::upstream(provider, cause))?;

            match signal {
                StreamSignal::Text(text) => {
                    if !text.is_empty() {
                        fragments += 1;
                        yield Bytes::from(text);
                    }
                }
                StreamSignal::Skip => {}
                StreamSignal::Done => break,
            }
        }

        if fragments == 0 {
            tracing::debug!(provider = %provider, "stream ended without text, sending fallback reply");
            yield Bytes::from_static(NO_RESPONSE_FALLBACK.as_bytes());
        } else {
            tracing::debug!(provider = %provider, fragments, "upstream stream complete");
        }
    })
}

fn sse_cause(err: EventStreamError<UpstreamCause>) -> UpstreamCause {
    match err {
        EventStreamError::Transport(cause) => cause,
        EventStreamError::Utf8(e) => UpstreamCause::Stream(format!("invalid UTF-8 in event stream: {e}")),
        EventStreamError::Parser(e) => UpstreamCause::Stream(format!("invalid event stream framing: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::adapter::{parse_event_json, text_at};
    use arena_types::llm::{ProviderKind, UpstreamRequest};
    use futures_util::TryStreamExt;

    /// Minimal adapter: text at `/text`, `[DONE]` ends the stream, `error` events fail.
    struct EchoAdapter;

    impl ProviderAdapter for EchoAdapter {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Local
        }

        fn default_model(&self) -> &str {
            "echo"
        }

        fn build_request(&self, _model: &str, _message: &str, _stream: bool) -> UpstreamRequest {
            UpstreamRequest::new(ProviderKind::Local, "http://echo.test".into(), serde_json::json!({}))
        }

        fn reply_pointer(&self) -> &'static str {
            "/text"
        }

        fn interpret_event(&self, event: &str, data: &str) -> Result<StreamSignal, UpstreamCause> {
            if event == "error" {
                return Err(UpstreamCause::Stream(data.to_string()));
            }
            if data == "[DONE]" {
                return Ok(StreamSignal::Done);
            }
            let value = parse_event_json(data)?;
            Ok(text_at(&value, "/text").map_or(StreamSignal::Skip, StreamSignal::Text))
        }
    }

    fn body(chunks: &[&'static str]) -> ByteStream {
        let items: Vec<Result<Bytes, UpstreamCause>> =
            chunks.iter().map(|c| Ok(Bytes::from_static(c.as_bytes()))).collect();
        Box::pin(futures_util::stream::iter(items))
    }

    async fn collect(stream: FragmentStream) -> Result<Vec<String>, RelayError> {
        let chunks: Vec<Bytes> = stream.try_collect().await?;
        Ok(chunks
            .into_iter()
            .map(|b| String::from_utf8(b.to_vec()).unwrap())
            .collect())
    }

    #[tokio::test]
    async fn test_fragments_follow_event_order_across_chunk_splits() {
        let stream = fragment_stream(
            Arc::new(EchoAdapter),
            body(&[
                "data: {\"text\":\"Hel\"}\n\ndata: {\"te",
                "xt\":\"lo, \"}\n\n",
                ": keep-alive\n\ndata: {\"other\":1}\n\n",
                "data: {\"text\":\"world\"}\n\ndata: [DONE]\n\n",
                "data: {\"text\":\"ignored after done\"}\n\n",
            ]),
        );

        let fragments = collect(stream).await.unwrap();
        assert_eq!(fragments, vec!["Hel", "lo, ", "world"]);
    }

    #[tokio::test]
    async fn test_empty_stream_yields_fallback_reply() {
        let stream = fragment_stream(Arc::new(EchoAdapter), body(&["data: [DONE]\n\n"]));
        let fragments = collect(stream).await.unwrap();
        assert_eq!(fragments, vec![NO_RESPONSE_FALLBACK]);
    }

    #[tokio::test]
    async fn test_error_event_fails_stream_with_provider() {
        let stream = fragment_stream(
            Arc::new(EchoAdapter),
            body(&["data: {\"text\":\"partial\"}\n\n", "event: error\ndata: overloaded\n\n"]),
        );

        let err = collect(stream).await.unwrap_err();
        match err {
            RelayError::Upstream { provider, cause } => {
                assert_eq!(provider, ProviderKind::Local);
                assert!(matches!(cause, UpstreamCause::Stream(ref m) if m == "overloaded"));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_mid_stream_is_upstream_error() {
        let items: Vec<Result<Bytes, UpstreamCause>> = vec![
            Ok(Bytes::from_static(b"data: {\"text\":\"a\"}\n\n")),
            Err(UpstreamCause::Network("connection reset".to_string())),
        ];
        let stream = fragment_stream(Arc::new(EchoAdapter), Box::pin(futures_util::stream::iter(items)));

        let err = collect(stream).await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::Upstream { cause: UpstreamCause::Network(_), .. }
        ));
    }
}
