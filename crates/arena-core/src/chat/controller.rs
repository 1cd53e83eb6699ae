//! ChatSessionController -- drives one conversation against the relay.
//!
//! `send` appends the user message and an empty assistant placeholder, asks
//! the relay for a reply, and rewrites the placeholder with the cumulative
//! decoded text as each chunk arrives. At most one send is in flight per
//! controller; a second call while one is running is ignored.
//!
//! The log lives inside a `tokio::sync::watch` channel so rendering layers
//! can subscribe to snapshots without holding a lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use futures_util::StreamExt;
use tokio::sync::watch;

use arena_types::chat::ChatMessage;
use arena_types::error::ClientError;
use arena_types::relay::RelayRequestBody;

use super::client::{ChunkStream, RelayClient, RelayReply};
use super::decoder::Utf8StreamDecoder;
use super::log::ConversationLog;

/// Shown in the placeholder when the relay cannot be reached or the body read fails.
pub const UNREACHABLE_MESSAGE: &str = "Failed to reach the chat server.";

/// Why a `send` call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyInput,
    InFlight,
}

/// Result of a `send` call.
#[derive(Debug)]
pub enum SendOutcome {
    /// The reply was fully received into the log.
    Completed,
    /// The request failed; the placeholder now holds an error message.
    Failed(ClientError),
    /// Nothing was sent.
    Ignored(IgnoreReason),
}

/// Per-conversation choices that go along with each request.
#[derive(Debug, Clone, Default)]
struct Draft {
    input: String,
    model: Option<String>,
    provider: Option<String>,
    stream: bool,
}

/// Clears the in-flight flag however the send ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ChatSessionController<C> {
    client: C,
    log: watch::Sender<ConversationLog>,
    draft: Mutex<Draft>,
    in_flight: AtomicBool,
}

impl<C: RelayClient> ChatSessionController<C> {
    pub fn new(client: C) -> Self {
        Self::with_log(client, ConversationLog::new())
    }

    /// Resume a conversation from a saved log.
    pub fn with_log(client: C, log: ConversationLog) -> Self {
        let (log, _) = watch::channel(log);
        Self {
            client,
            log,
            draft: Mutex::new(Draft {
                stream: true,
                ..Default::default()
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Snapshot of the conversation log.
    pub fn log(&self) -> ConversationLog {
        self.log.borrow().clone()
    }

    /// Receive a fresh snapshot after every log mutation.
    pub fn subscribe(&self) -> watch::Receiver<ConversationLog> {
        self.log.subscribe()
    }

    /// Drop all messages. Refused while a reply is streaming into the log.
    pub fn clear(&self) -> bool {
        if self.is_in_flight() {
            return false;
        }
        self.log.send_replace(ConversationLog::new());
        true
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn input(&self) -> String {
        self.draft().input.clone()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.draft().input = text.into();
    }

    pub fn model(&self) -> Option<String> {
        self.draft().model.clone()
    }

    pub fn set_model(&self, model: Option<String>) {
        self.draft().model = model;
    }

    pub fn provider(&self) -> Option<String> {
        self.draft().provider.clone()
    }

    pub fn set_provider(&self, provider: Option<String>) {
        self.draft().provider = provider;
    }

    /// Ask the relay for a streamed body (default) or a single JSON reply.
    pub fn set_streaming(&self, stream: bool) {
        self.draft().stream = stream;
    }

    /// Send whatever is currently in the input buffer.
    pub async fn submit(&self) -> SendOutcome {
        let text = self.input();
        self.send(&text).await
    }

    /// Send one user message and fill in the assistant reply.
    ///
    /// No-op if `user_text` is blank or another send is still in flight.
    /// Only this message (plus the selected model/provider) goes upstream;
    /// earlier log entries are not sent.
    pub async fn send(&self, user_text: &str) -> SendOutcome {
        if user_text.trim().is_empty() {
            return SendOutcome::Ignored(IgnoreReason::EmptyInput);
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("send ignored, a reply is still streaming");
            return SendOutcome::Ignored(IgnoreReason::InFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let request = {
            let mut draft = self.draft();
            draft.input.clear();
            RelayRequestBody {
                message: user_text.to_string(),
                model: draft.model.clone(),
                provider: draft.provider.clone(),
                stream: draft.stream,
            }
        };

        let mut placeholder = 0;
        self.log.send_modify(|log| {
            log.append(ChatMessage::user(user_text));
            placeholder = log.append(ChatMessage::assistant(""));
        });

        match self.client.send(request).await {
            Ok(RelayReply::Whole(text)) => {
                self.rewrite(placeholder, text);
                SendOutcome::Completed
            }
            Ok(RelayReply::Streamed(chunks)) => self.consume(placeholder, chunks).await,
            Err(err) => self.fail(placeholder, err),
        }
    }

    /// Read the body chunk by chunk, rewriting the placeholder each time.
    async fn consume(&self, placeholder: usize, mut chunks: ChunkStream) -> SendOutcome {
        let mut decoder = Utf8StreamDecoder::new();
        let mut text = String::new();

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    text.push_str(&decoder.decode(&bytes));
                    self.rewrite(placeholder, text.clone());
                }
                Err(err) => return self.fail(placeholder, err),
            }
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            text.push_str(&tail);
            self.rewrite(placeholder, text);
        }
        let replaced = decoder.errors().len();
        if replaced > 0 {
            tracing::warn!(replaced, "reply contained undecodable bytes");
        }
        SendOutcome::Completed
    }

    fn fail(&self, placeholder: usize, err: ClientError) -> SendOutcome {
        tracing::warn!(error = %err, "chat request failed");
        let message = match &err {
            ClientError::Rejected { message, .. } => message.as_str(),
            ClientError::Network(_) | ClientError::UnexpectedResponse(_) => UNREACHABLE_MESSAGE,
        };
        self.rewrite(placeholder, format!("Error: {message}"));
        SendOutcome::Failed(err)
    }

    fn rewrite(&self, index: usize, content: String) {
        self.log.send_modify(|log| {
            if let Err(err) = log.replace_at(index, ChatMessage::assistant(content)) {
                tracing::error!(%err, "placeholder vanished from conversation log");
            }
        });
    }

    fn draft(&self) -> MutexGuard<'_, Draft> {
        self.draft.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
