//! Application state shared by all HTTP handlers.
//!
//! The relay is generic over its upstream transport; `AppState` defaults it
//! to the reqwest transport from `arena-infra`. Tests substitute a fake.

use std::sync::Arc;

use arena_core::llm::relay::ProviderRelay;
use arena_infra::llm::build_relay;
use arena_infra::llm::transport::ReqwestTransport;
use arena_infra::secret::ProviderCredentials;
use arena_types::config::RelayConfig;

/// Shared application state.
pub struct AppState<T = ReqwestTransport> {
    pub relay: Arc<ProviderRelay<T>>,
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            relay: Arc::clone(&self.relay),
        }
    }
}

impl<T> AppState<T> {
    pub fn new(relay: ProviderRelay<T>) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

impl AppState {
    /// Resolve credentials and wire the relay with the production transport.
    ///
    /// Fails if an enabled provider is missing its API key or nothing is enabled.
    pub fn init(config: &RelayConfig) -> anyhow::Result<Self> {
        let credentials = ProviderCredentials::from_env(config)?;
        let transport = ReqwestTransport::new()?;
        let relay = build_relay(transport, config, &credentials)?;
        Ok(Self::new(relay))
    }
}
