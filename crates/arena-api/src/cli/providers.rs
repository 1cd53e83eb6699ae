//! `arena providers` -- show what the relay would serve with the current config.

use std::path::Path;

use console::style;

use arena_infra::config::load_with_env;
use arena_infra::secret::{CredentialSource, EnvCredentialSource};
use arena_types::llm::ProviderKind;

pub async fn list_providers(config_path: &Path) -> anyhow::Result<()> {
    let config = load_with_env(config_path).await?;
    let env = EnvCredentialSource::new();

    println!();
    println!("  {}", style("Providers").bold());
    println!();
    for kind in ProviderKind::ALL {
        let provider = config.provider(kind);
        let state = if provider.enabled {
            style("enabled ").green()
        } else {
            style("disabled").dim()
        };
        let key = match env.get(&provider.api_key_env) {
            Some(_) => format!("{} {}", style("✓").green(), provider.api_key_env),
            None if kind.requires_api_key() => format!("{} {} not set", style("✗").red(), provider.api_key_env),
            None => style(format!("- {} (optional)", provider.api_key_env)).dim().to_string(),
        };
        println!(
            "  {:<10} {}  {:<26} {}",
            style(kind.as_str()).cyan(),
            state,
            provider.default_model,
            style(&provider.base_url).dim()
        );
        println!("  {:<10} {}", "", key);
    }
    println!();
    Ok(())
}
