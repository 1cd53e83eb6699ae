//! Shared domain types for Chat Arena.
//!
//! This crate contains the types passed between the relay endpoint, the
//! provider adapters and the chat session controller: chat messages,
//! provider identifiers, upstream request descriptions, the HTTP wire bodies,
//! configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, thiserror, secrecy.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod relay;
