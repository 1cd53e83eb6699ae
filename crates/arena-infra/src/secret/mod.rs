//! Credential resolution for enabled providers.
//!
//! Credentials are looked up once at startup. The result,
//! [`ProviderCredentials`], holds one [`SecretString`] per provider that has
//! one and is handed to the adapter factory. Nothing here logs a secret.

pub mod env;

use std::collections::BTreeMap;

use secrecy::SecretString;

use arena_types::config::RelayConfig;
use arena_types::error::ConfigError;
use arena_types::llm::ProviderKind;

pub use self::env::EnvCredentialSource;

/// Where credential values come from.
pub trait CredentialSource: Send + Sync {
    fn get(&self, key: &str) -> Option<SecretString>;
}

/// Resolved API keys, keyed by provider.
#[derive(Default)]
pub struct ProviderCredentials {
    keys: BTreeMap<ProviderKind, SecretString>,
}

impl ProviderCredentials {
    /// Resolve a key for every enabled provider.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoProvidersEnabled`] if nothing is switched on
    /// - [`ConfigError::MissingCredential`] if an enabled provider needs a key
    ///   and its variable is unset
    pub fn resolve(config: &RelayConfig, source: &dyn CredentialSource) -> Result<Self, ConfigError> {
        let enabled = config.enabled_providers();
        if enabled.is_empty() {
            return Err(ConfigError::NoProvidersEnabled);
        }

        let mut keys = BTreeMap::new();
        for provider in enabled {
            match source.get(&provider.api_key_env) {
                Some(key) => {
                    keys.insert(provider.kind, key);
                }
                None if provider.kind.requires_api_key() => {
                    return Err(ConfigError::MissingCredential {
                        provider: provider.kind,
                        env_var: provider.api_key_env,
                    });
                }
                None => {
                    tracing::debug!(provider = %provider.kind, "no credential configured, sending requests unauthenticated");
                }
            }
        }
        Ok(Self { keys })
    }

    /// Resolve from process environment variables.
    pub fn from_env(config: &RelayConfig) -> Result<Self, ConfigError> {
        Self::resolve(config, &EnvCredentialSource::new())
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&SecretString> {
        self.keys.get(&kind)
    }

    /// Explicitly set a key (tests, embedding).
    pub fn insert(&mut self, kind: ProviderKind, key: SecretString) {
        self.keys.insert(kind, key);
    }
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.keys.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapSource(HashMap<&'static str, &'static str>);

    impl CredentialSource for MapSource {
        fn get(&self, key: &str) -> Option<SecretString> {
            self.0.get(key).map(|v| SecretString::from(*v))
        }
    }

    fn source(pairs: &[(&'static str, &'static str)]) -> MapSource {
        MapSource(pairs.iter().copied().collect())
    }

    #[test]
    fn test_resolve_default_config_needs_openai_key() {
        let config = RelayConfig::default();
        let err = ProviderCredentials::resolve(&config, &source(&[])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential { provider: ProviderKind::OpenAi, ref env_var } if env_var == "OPENAI_API_KEY"
        ));

        let creds = ProviderCredentials::resolve(&config, &source(&[("OPENAI_API_KEY", "sk-1")])).unwrap();
        assert!(creds.get(ProviderKind::OpenAi).is_some());
        assert!(creds.get(ProviderKind::Anthropic).is_none());
    }

    #[test]
    fn test_local_key_is_optional() {
        let mut config = RelayConfig::default();
        config.set_enabled(&[ProviderKind::Local]);

        let creds = ProviderCredentials::resolve(&config, &source(&[])).unwrap();
        assert!(creds.get(ProviderKind::Local).is_none());
    }

    #[test]
    fn test_custom_env_var_name() {
        let mut config: RelayConfig = toml::from_str(
            r#"
[providers.anthropic]
enabled = true
api_key_env = "CLAUDE_KEY"
"#,
        )
        .unwrap();
        config.set_enabled(&[ProviderKind::Anthropic]);

        let creds = ProviderCredentials::resolve(&config, &source(&[("CLAUDE_KEY", "sk-ant")])).unwrap();
        assert!(creds.get(ProviderKind::Anthropic).is_some());
    }

    #[test]
    fn test_no_providers_enabled() {
        let mut config = RelayConfig::default();
        config.set_enabled(&[]);
        let err = ProviderCredentials::resolve(&config, &source(&[("OPENAI_API_KEY", "sk-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::NoProvidersEnabled));
    }

    #[test]
    fn test_debug_lists_providers_only() {
        let creds = ProviderCredentials::resolve(&RelayConfig::default(), &source(&[("OPENAI_API_KEY", "sk-secret")])).unwrap();
        let debug = format!("{creds:?}");
        assert!(debug.contains("OpenAi"));
        assert!(!debug.contains("sk-secret"));
    }
}
