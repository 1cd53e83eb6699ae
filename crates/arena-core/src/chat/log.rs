//! Append-only conversation log with in-place replacement of one entry.
//!
//! [`ConversationLog::append`] and [`ConversationLog::replace_at`] are the
//! only two mutation entry points. Streaming replies are applied as
//! replace-at-index with the cumulative text, so applying the same update
//! twice is harmless.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use arena_types::chat::ChatMessage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("log index {index} out of range (len {len})")]
pub struct LogIndexError {
    pub index: usize,
    pub len: usize,
}

/// Ordered chat history, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    messages: Vec<ChatMessage>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a previously saved log.
    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// Append a message and return its index.
    pub fn append(&mut self, message: ChatMessage) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Replace the message at `index` wholesale.
    pub fn replace_at(&mut self, index: usize, message: ChatMessage) -> Result<(), LogIndexError> {
        let len = self.messages.len();
        let slot = self
            .messages
            .get_mut(index)
            .ok_or(LogIndexError { index, len })?;
        *slot = message;
        Ok(())
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn get(&self, index: usize) -> Option<&ChatMessage> {
        self.messages.get(index)
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
