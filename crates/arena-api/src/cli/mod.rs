//! CLI command definitions for the `arena` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod providers;
pub mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Relay single chat messages to OpenAI, Anthropic, Gemini or a local model.
#[derive(Parser)]
#[command(name = "arena", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Relay configuration file.
    #[arg(long, global = true, env = "ARENA_CONFIG", default_value = "arena.toml")]
    pub config: PathBuf,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the relay HTTP server.
    Serve {
        /// Port to listen on (overrides config and ARENA_PORT).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config and ARENA_HOST).
        #[arg(long)]
        host: Option<String>,
    },

    /// Chat with a running relay from the terminal.
    Chat {
        /// Base URL of the relay server.
        #[arg(long, env = "ARENA_URL", default_value = "http://127.0.0.1:3000")]
        url: String,

        /// Model to request (the relay picks a default when omitted).
        #[arg(short, long)]
        model: Option<String>,

        /// Provider to request (inferred from the model when omitted).
        #[arg(long)]
        provider: Option<String>,

        /// Ask for whole JSON replies instead of streamed text.
        #[arg(long)]
        no_stream: bool,

        /// Load the conversation from, and save it back to, this JSON file.
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Show configured providers and whether their credentials are set.
    Providers,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
