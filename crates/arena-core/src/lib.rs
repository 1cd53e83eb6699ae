//! Relay and chat-session logic for Chat Arena.
//!
//! - [`llm`]: the provider adapter and upstream transport seams, and the
//!   [`ProviderRelay`](llm::relay::ProviderRelay) that turns a single user
//!   message into a normalized reply or fragment stream.
//! - [`chat`]: the client-side conversation log, stream decoder and
//!   [`ChatSessionController`](chat::controller::ChatSessionController).
//!
//! Concrete adapters and transports live in `arena-infra`.

pub mod chat;
pub mod llm;
