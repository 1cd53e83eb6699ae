//! LLM provider implementations.
//!
//! Concrete [`ProviderAdapter`](arena_core::llm::adapter::ProviderAdapter)s
//! for each supported vendor, the reqwest [`transport`], and a factory
//! ([`build_relay`]) that registers one adapter per enabled provider.

pub mod anthropic;
pub mod gemini;
pub mod openai_compat;
pub mod transport;

use arena_core::llm::relay::ProviderRelay;
use arena_core::llm::transport::UpstreamTransport;
use arena_types::config::{RelayConfig, ResolvedProvider};
use arena_types::error::ConfigError;
use arena_types::llm::ProviderKind;
use secrecy::SecretString;

use crate::secret::ProviderCredentials;

use self::anthropic::AnthropicAdapter;
use self::gemini::GeminiAdapter;
use self::openai_compat::OpenAiCompatAdapter;

/// Build a [`ProviderRelay`] with an adapter for every enabled provider.
///
/// Providers that are disabled in `config` get no adapter, so requests
/// naming them are rejected as unsupported before any network call.
///
/// # Errors
///
/// Returns [`ConfigError::NoProvidersEnabled`] if nothing is enabled, or
/// [`ConfigError::MissingCredential`] if a provider that needs a key has none.
pub fn build_relay<T: UpstreamTransport>(
    transport: T,
    config: &RelayConfig,
    credentials: &ProviderCredentials,
) -> Result<ProviderRelay<T>, ConfigError> {
    let enabled = config.enabled_providers();
    if enabled.is_empty() {
        return Err(ConfigError::NoProvidersEnabled);
    }

    let mut relay = ProviderRelay::new(transport);
    for provider in enabled {
        let key = credentials.get(provider.kind).cloned();
        relay = match provider.kind {
            ProviderKind::OpenAi => relay.with_adapter(
                OpenAiCompatAdapter::openai(required(&provider, key)?, &provider.default_model)
                    .with_base_url(&provider.base_url),
            ),
            ProviderKind::Local => relay.with_adapter(
                OpenAiCompatAdapter::local(key, &provider.default_model).with_base_url(&provider.base_url),
            ),
            ProviderKind::Anthropic => relay.with_adapter(
                AnthropicAdapter::new(required(&provider, key)?, &provider.default_model)
                    .with_base_url(&provider.base_url),
            ),
            ProviderKind::Gemini => relay.with_adapter(
                GeminiAdapter::new(required(&provider, key)?, &provider.default_model)
                    .with_base_url(&provider.base_url),
            ),
        };
        tracing::info!(
            provider = %provider.kind,
            model = %provider.default_model,
            base_url = %provider.base_url,
            "registered provider"
        );
    }
    Ok(relay)
}

fn required(provider: &ResolvedProvider, key: Option<SecretString>) -> Result<SecretString, ConfigError> {
    key.ok_or_else(|| ConfigError::MissingCredential {
        provider: provider.kind,
        env_var: provider.api_key_env.clone(),
    })
}
