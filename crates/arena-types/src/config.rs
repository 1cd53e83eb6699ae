//! Relay configuration types.
//!
//! Deserialized from `arena.toml`. Every field is optional in the file;
//! anything left out falls back to the per-provider defaults below.
//! Credentials are never stored here -- only the name of the environment
//! variable that holds them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::llm::ProviderKind;

/// Top-level configuration for the relay server.
///
/// `providers` is keyed by the lowercase provider name (`[providers.openai]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderSettings>,
}

/// Listen address for `arena serve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Per-provider overrides as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

/// Provider settings with all defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub kind: ProviderKind,
    pub enabled: bool,
    pub base_url: String,
    pub default_model: String,
    pub api_key_env: String,
}

impl ProviderKind {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com",
            ProviderKind::Anthropic => "https://api.anthropic.com",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
            ProviderKind::Local => "http://localhost:11434",
        }
    }

    /// Model used when the caller does not name one.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-3.5-turbo",
            ProviderKind::Anthropic => "claude-3-haiku-20240307",
            ProviderKind::Gemini => "gemini-1.5-flash",
            ProviderKind::Local => "mistral-7b",
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Local => "LOCAL_API_KEY",
        }
    }

    /// Whether the relay refuses to start without a credential for this provider.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderKind::Local)
    }

    fn enabled_by_default(&self) -> bool {
        matches!(self, ProviderKind::OpenAi)
    }
}

impl RelayConfig {
    /// Resolve one provider's settings, filling gaps with defaults.
    pub fn provider(&self, kind: ProviderKind) -> ResolvedProvider {
        let settings = self.providers.get(kind.as_str()).cloned().unwrap_or_default();
        ResolvedProvider {
            kind,
            enabled: settings.enabled.unwrap_or_else(|| kind.enabled_by_default()),
            base_url: settings
                .base_url
                .unwrap_or_else(|| kind.default_base_url().to_string()),
            default_model: settings
                .default_model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| kind.default_model().to_string()),
            api_key_env: settings
                .api_key_env
                .unwrap_or_else(|| kind.default_api_key_env().to_string()),
        }
    }

    /// All providers that are switched on, in declaration order.
    pub fn enabled_providers(&self) -> Vec<ResolvedProvider> {
        ProviderKind::ALL
            .iter()
            .map(|kind| self.provider(*kind))
            .filter(|p| p.enabled)
            .collect()
    }

    /// Enable exactly the given providers, disabling every other one.
    pub fn set_enabled(&mut self, enabled: &[ProviderKind]) {
        for kind in ProviderKind::ALL {
            self.providers
                .entry(kind.as_str().to_string())
                .or_default()
                .enabled = Some(enabled.contains(&kind));
        }
    }
}
