//! Terminal output for streamed replies.
//!
//! The controller publishes the whole cumulative reply on every change;
//! `ReplyPrinter` works out which part is new and prints only that. A
//! spinner runs until the first visible text.

use std::io::Write;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

pub struct ReplyPrinter {
    /// Reply text already on screen.
    shown: String,
    spinner: Option<ProgressBar>,
    label: String,
}

impl ReplyPrinter {
    /// Start a spinner for a reply labelled with `label` (the model name).
    pub fn start(label: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
            spinner.set_style(template);
        }
        spinner.set_message("thinking...");
        spinner.enable_steady_tick(Duration::from_millis(80));

        Self {
            shown: String::new(),
            spinner: Some(spinner),
            label: label.to_string(),
        }
    }

    /// Print whatever `reply` adds beyond what was already shown.
    pub fn update(&mut self, reply: &str) {
        let Some(fresh) = self.fresh_suffix(reply) else {
            return;
        };
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
            print!("\n  {} ", style(&self.label).cyan().bold());
        }
        print!("{fresh}");
        let _ = std::io::stdout().flush();
        self.shown = reply.to_string();
    }

    /// Finish the reply line (or drop the spinner if nothing was printed).
    pub fn finish(&mut self, elapsed: Duration) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        println!();
        println!(
            "\n  {} {:.1}s {} {}",
            style("|").dim(),
            style(elapsed.as_secs_f64()).dim(),
            style("\u{00b7}").dim(),
            style(&self.label).dim(),
        );
        println!();
    }

    /// Print a failed reply. Any partial text already shown stays on screen.
    pub fn fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        } else {
            println!();
        }
        eprintln!("\n  {} {}", style("!").red().bold(), message);
        eprintln!("  {}", style("Type a message to retry, /exit to quit.").dim());
        println!();
    }

    /// New text at the end of `reply`, or `None` if nothing new is printable.
    ///
    /// Only a reply that starts with the text already shown is printed. Any
    /// other rewrite of the placeholder (an error message) goes through
    /// [`ReplyPrinter::fail`].
    fn fresh_suffix<'a>(&self, reply: &'a str) -> Option<&'a str> {
        reply
            .strip_prefix(self.shown.as_str())
            .filter(|fresh| !fresh.is_empty())
    }
}
