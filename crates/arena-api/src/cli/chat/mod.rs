//! Interactive terminal chat against a running relay.
//!
//! Streams replies into the terminal as they arrive, with a spinner until
//! the first fragment, slash commands, and optional JSON history
//! persistence. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod history;
pub mod input;
pub mod loop_runner;
pub mod renderer;
