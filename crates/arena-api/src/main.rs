//! Chat Arena entry point.
//!
//! Binary name: `arena`
//!
//! `arena serve` runs the relay endpoint; `arena chat` is a terminal client
//! for it.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use arena_observe::tracing_setup::{default_directive, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need logging or config
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "arena", &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(default_directive(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = match cli.command {
        Commands::Serve { port, host } => cli::serve::run_serve(&cli.config, host, port).await,
        Commands::Chat {
            url,
            model,
            provider,
            no_stream,
            history,
        } => {
            let options = cli::chat::loop_runner::ChatOptions {
                url,
                model,
                provider,
                stream: !no_stream,
                history,
            };
            cli::chat::loop_runner::run_chat_loop(options).await
        }
        Commands::Providers => cli::providers::list_providers(&cli.config).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}
