//! Main chat loop orchestration.
//!
//! Reads lines, handles slash commands, and hands messages to the
//! [`ChatSessionController`]. While a send is running, log snapshots from
//! the controller's watch channel drive the terminal output.

use std::path::PathBuf;
use std::time::Instant;

use console::style;
use tracing::{info, warn};

use arena_core::chat::client::RelayClient;
use arena_core::chat::controller::{ChatSessionController, IgnoreReason, SendOutcome};
use arena_infra::client::HttpRelayClient;
use arena_types::chat::MessageRole;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::history::{load_history, save_history};
use super::input::{ChatInput, InputEvent};
use super::renderer::ReplyPrinter;

/// Settings for one `arena chat` session.
pub struct ChatOptions {
    pub url: String,
    pub model: Option<String>,
    pub provider: Option<String>,
    pub stream: bool,
    pub history: Option<PathBuf>,
}

/// Run the interactive chat loop against the relay at `options.url`.
pub async fn run_chat_loop(options: ChatOptions) -> anyhow::Result<()> {
    let client = HttpRelayClient::new(&options.url)?;
    let endpoint = client.endpoint().to_string();

    let log = match &options.history {
        Some(path) => load_history(path).await?,
        None => Default::default(),
    };
    let restored = log.len();

    let controller = ChatSessionController::with_log(client, log);
    controller.set_model(options.model.clone());
    controller.set_provider(options.provider.clone());
    controller.set_streaming(options.stream);

    print_welcome_banner(&endpoint, options.model.as_deref(), options.provider.as_deref(), restored);

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) =
        ChatInput::new(prompt).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(),
                        ChatCommand::Clear => {
                            controller.clear();
                            chat_input.clear();
                            persist(&options.history, &controller).await;
                        }
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::History => print_history(&controller),
                        ChatCommand::Model(None) => print_setting("Model", controller.model(), "relay default"),
                        ChatCommand::Model(Some(name)) => {
                            controller.set_model(commands::selection(&name));
                            print_setting("Model", controller.model(), "relay default");
                        }
                        ChatCommand::Provider(None) => print_setting("Provider", controller.provider(), "inferred"),
                        ChatCommand::Provider(Some(name)) => {
                            controller.set_provider(commands::selection(&name));
                            print_setting("Provider", controller.provider(), "inferred");
                        }
                        ChatCommand::Unknown(name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            );
                        }
                    }
                    continue;
                }

                controller.set_input(text);
                send_and_render(&controller).await;
                persist(&options.history, &controller).await;
            }
        }
    }

    persist(&options.history, &controller).await;
    chat_input.flush();
    Ok(())
}

/// Submit the pending input and print the reply as it streams in.
async fn send_and_render<C: RelayClient>(controller: &ChatSessionController<C>) {
    let label = controller.model().unwrap_or_else(|| "assistant".to_string());
    let mut printer = ReplyPrinter::start(&label);
    let mut updates = controller.subscribe();
    let start = Instant::now();

    let send = controller.submit();
    tokio::pin!(send);

    let outcome = loop {
        tokio::select! {
            biased;
            outcome = &mut send => break outcome,
            changed = updates.changed() => {
                if changed.is_ok() {
                    let reply = latest_reply(&updates.borrow_and_update());
                    printer.update(&reply);
                }
            }
        }
    };

    match outcome {
        SendOutcome::Completed => {
            printer.update(&latest_reply(&controller.log()));
            printer.finish(start.elapsed());
            info!(elapsed_ms = start.elapsed().as_millis() as u64, "reply complete");
        }
        SendOutcome::Failed(err) => {
            warn!(error = %err, "reply failed");
            let message = controller
                .log()
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_else(|| err.to_string());
            printer.fail(&message);
        }
        SendOutcome::Ignored(IgnoreReason::InFlight) => {
            printer.fail("A reply is still streaming; wait for it to finish.");
        }
        SendOutcome::Ignored(IgnoreReason::EmptyInput) => {
            printer.finish(start.elapsed());
        }
    }
}

fn latest_reply(log: &arena_core::chat::log::ConversationLog) -> String {
    log.last()
        .filter(|m| m.role == MessageRole::Assistant)
        .map(|m| m.content.clone())
        .unwrap_or_default()
}

fn print_history<C: RelayClient>(controller: &ChatSessionController<C>) {
    let log = controller.log();
    println!();
    if log.is_empty() {
        println!("  {}", style("No messages yet.").dim());
    }
    for msg in log.messages() {
        let label = match msg.role {
            MessageRole::User => style("You").green().bold(),
            MessageRole::Assistant => style("Bot").cyan().bold(),
        };
        let preview: String = if msg.content.chars().count() > 100 {
            format!("{}...", msg.content.chars().take(97).collect::<String>())
        } else {
            msg.content.clone()
        };
        println!("  {label} {preview}");
    }
    println!();
}

fn print_setting(name: &str, value: Option<String>, fallback: &str) {
    println!(
        "\n  {} {}\n",
        style(format!("{name}:")).bold(),
        style(value.as_deref().unwrap_or(fallback)).cyan()
    );
}

async fn persist<C: RelayClient>(path: &Option<PathBuf>, controller: &ChatSessionController<C>) {
    if let Some(path) = path {
        if let Err(e) = save_history(path, &controller.log()).await {
            warn!(error = %e, path = %path.display(), "failed to save chat history");
        }
    }
}
