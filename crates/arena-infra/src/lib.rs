//! Infrastructure layer for Chat Arena.
//!
//! Contains the concrete implementations of the seams defined in `arena-core`:
//! provider adapters (OpenAI-compatible, Anthropic, Gemini), the reqwest
//! upstream transport, the HTTP relay client used by the terminal chat,
//! config file loading, and credential resolution from the environment.

pub mod client;
pub mod config;
pub mod llm;
pub mod secret;
