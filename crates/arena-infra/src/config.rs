//! Relay configuration loader.
//!
//! Reads `arena.toml` (or the path given on the command line) into a
//! [`RelayConfig`], then applies `ARENA_*` environment overrides. Unlike a
//! missing file, a file that exists but cannot be read or parsed is a
//! startup error: silently falling back would enable the wrong providers.

use std::path::Path;
use std::str::FromStr;

use arena_types::config::RelayConfig;
use arena_types::error::ConfigError;
use arena_types::llm::ProviderKind;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "arena.toml";

/// Comma-separated list of providers to enable, e.g. `openai,anthropic`.
pub const ENV_PROVIDERS: &str = "ARENA_PROVIDERS";
pub const ENV_HOST: &str = "ARENA_HOST";
pub const ENV_PORT: &str = "ARENA_PORT";

/// Load configuration from `path`.
///
/// - Missing file: defaults (only `openai` enabled, `127.0.0.1:3000`).
/// - Unreadable file: [`ConfigError::Read`].
/// - Malformed TOML: [`ConfigError::Parse`].
pub async fn load_relay_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(RelayConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    toml::from_str::<RelayConfig>(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Apply `ARENA_PROVIDERS`, `ARENA_HOST` and `ARENA_PORT` on top of `config`.
///
/// `lookup` resolves a variable name to its value; pass
/// [`std::env::var`]-backed lookup in production.
pub fn apply_env_overrides(
    config: &mut RelayConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(list) = lookup(ENV_PROVIDERS) {
        let kinds = parse_provider_list(&list)?;
        config.set_enabled(&kinds);
    }
    if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
        config.server.host = host.trim().to_string();
    }
    if let Some(port) = lookup(ENV_PORT) {
        config.server.port = port.trim().parse().map_err(|e| ConfigError::InvalidValue {
            key: ENV_PORT.to_string(),
            message: format!("'{port}': {e}"),
        })?;
    }
    Ok(())
}

/// Load from `path` and apply process environment overrides.
pub async fn load_with_env(path: &Path) -> Result<RelayConfig, ConfigError> {
    let mut config = load_relay_config(path).await?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn parse_provider_list(list: &str) -> Result<Vec<ProviderKind>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            ProviderKind::from_str(name).map_err(|message| ConfigError::InvalidValue {
                key: ENV_PROVIDERS.to_string(),
                message,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[tokio::test]
    async fn load_relay_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_relay_config(&tmp.path().join(DEFAULT_CONFIG_FILE)).await.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(
            config.enabled_providers().iter().map(|p| p.kind).collect::<Vec<_>>(),
            vec![ProviderKind::OpenAi]
        );
    }

    #[tokio::test]
    async fn load_relay_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        tokio::fs::write(
            &path,
            r#"
[server]
host = "0.0.0.0"
port = 8080

[providers.anthropic]
enabled = true
default_model = "claude-3-sonnet-20240229"

[providers.openai]
enabled = false
"#,
        )
        .await
        .unwrap();

        let config = load_relay_config(&path).await.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);

        let enabled = config.enabled_providers();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].kind, ProviderKind::Anthropic);
        assert_eq!(enabled[0].default_model, "claude-3-sonnet-20240229");
    }

    #[tokio::test]
    async fn load_relay_config_invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        tokio::fs::write(&path, "this is not { valid toml !!!").await.unwrap();

        let err = load_relay_config(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[tokio::test]
    async fn load_relay_config_directory_is_a_read_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_relay_config(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn env_overrides_replace_enabled_set_and_address() {
        let mut config = RelayConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[(ENV_PROVIDERS, " Anthropic, local ,"), (ENV_HOST, "0.0.0.0"), (ENV_PORT, "8081")]),
        )
        .unwrap();

        let kinds: Vec<_> = config.enabled_providers().iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![ProviderKind::Anthropic, ProviderKind::Local]);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn env_overrides_reject_unknown_provider() {
        let mut config = RelayConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_PROVIDERS, "openai,cohere")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_PROVIDERS));
    }

    #[test]
    fn env_overrides_reject_bad_port() {
        let mut config = RelayConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_PORT, "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_PORT));
    }

    #[test]
    fn no_overrides_leaves_config_untouched() {
        let mut config = RelayConfig::default();
        apply_env_overrides(&mut config, env(&[])).unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.providers.is_empty());
    }
}
