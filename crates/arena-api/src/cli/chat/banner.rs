//! Welcome banner display for chat sessions.

use console::style;

/// Print the banner shown when `arena chat` starts.
pub fn print_welcome_banner(endpoint: &str, model: Option<&str>, provider: Option<&str>, restored: usize) {
    println!();
    println!("  {} {}", style("⚔").bold(), style("Chat Arena").cyan().bold());
    println!("  {}", style(endpoint).dim());
    println!();
    println!(
        "  {}     {}",
        style("Model:").bold(),
        style(model.unwrap_or("relay default")).dim()
    );
    println!(
        "  {}  {}",
        style("Provider:").bold(),
        style(provider.unwrap_or("inferred")).dim()
    );
    if restored > 0 {
        println!(
            "  {}   {}",
            style("History:").bold(),
            style(format!("{restored} message(s) restored")).dim()
        );
    }
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
