//! ProviderRelay -- the provider adapter contract behind the relay endpoint.
//!
//! Given a [`ProviderRequest`] (provider name, model, one user message) the
//! relay selects an adapter, applies defaults, sends the request through the
//! [`UpstreamTransport`], and normalizes whatever the vendor returns into
//! either a single reply string or a [`FragmentStream`].
//!
//! Provider resolution happens before any network call, so an unsupported
//! provider never reaches the transport. Nothing is retried.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{Instrument, debug, info_span};

use arena_types::error::{RelayError, UpstreamCause};
use arena_types::llm::{NO_RESPONSE_FALLBACK, ProviderKind, ProviderRequest};

use super::adapter::ProviderAdapter;
use super::sse::{FragmentStream, fragment_stream};
use super::transport::{UpstreamResponse, UpstreamTransport};

/// Upper bound on the upstream error body kept for logging.
const ERROR_BODY_EXCERPT: usize = 512;

/// An adapter and concrete model chosen for one request.
#[derive(Clone)]
pub struct ResolvedCall {
    pub adapter: Arc<dyn ProviderAdapter>,
    pub model: String,
}

impl ResolvedCall {
    pub fn provider(&self) -> ProviderKind {
        self.adapter.kind()
    }
}

/// Routes single-message chat requests to the configured provider adapters.
///
/// Stateless across requests; safe to share behind an `Arc` between
/// concurrently running handlers.
pub struct ProviderRelay<T> {
    adapters: BTreeMap<ProviderKind, Arc<dyn ProviderAdapter>>,
    transport: T,
}

impl<T: UpstreamTransport> ProviderRelay<T> {
    pub fn new(transport: T) -> Self {
        Self {
            adapters: BTreeMap::new(),
            transport,
        }
    }

    /// Register an adapter. A later adapter for the same provider replaces
    /// the earlier one.
    pub fn with_adapter<A: ProviderAdapter + 'static>(mut self, adapter: A) -> Self {
        self.adapters.insert(adapter.kind(), Arc::new(adapter));
        self
    }

    /// Providers this relay will accept, in canonical order.
    pub fn providers(&self) -> Vec<ProviderKind> {
        self.adapters.keys().copied().collect()
    }

    pub fn adapter(&self, kind: ProviderKind) -> Option<&Arc<dyn ProviderAdapter>> {
        self.adapters.get(&kind)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The provider used when the caller names none and the model gives no hint.
    fn fallback_provider(&self) -> Option<ProviderKind> {
        if self.adapters.contains_key(&ProviderKind::OpenAi) {
            Some(ProviderKind::OpenAi)
        } else {
            self.adapters.keys().next().copied()
        }
    }

    /// Pick the adapter and model for a request without touching the network.
    ///
    /// - An explicit provider must parse and be registered, otherwise
    ///   [`RelayError::UnsupportedProvider`].
    /// - Without a provider, one is inferred from the model name; if that
    ///   provider is not registered the fallback provider is used.
    /// - A missing or blank model becomes the adapter's default model.
    pub fn resolve(&self, request: &ProviderRequest) -> Result<ResolvedCall, RelayError> {
        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty());

        let kind = match request.provider.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(name) => {
                let kind: ProviderKind = name
                    .parse()
                    .map_err(|_| RelayError::UnsupportedProvider(name.to_string()))?;
                if !self.adapters.contains_key(&kind) {
                    return Err(RelayError::UnsupportedProvider(name.to_string()));
                }
                kind
            }
            None => {
                let inferred = model.map(ProviderKind::infer_from_model);
                match inferred.filter(|k| self.adapters.contains_key(k)) {
                    Some(kind) => kind,
                    None => self.fallback_provider().ok_or_else(|| {
                        RelayError::UnsupportedProvider(ProviderKind::OpenAi.to_string())
                    })?,
                }
            }
        };

        let adapter = self
            .adapters
            .get(&kind)
            .cloned()
            .ok_or_else(|| RelayError::UnsupportedProvider(kind.to_string()))?;

        let model = model
            .map(str::to_string)
            .unwrap_or_else(|| adapter.default_model().to_string());

        Ok(ResolvedCall { adapter, model })
    }

    /// Send the request and return the full normalized reply.
    ///
    /// A response without extractable text yields [`NO_RESPONSE_FALLBACK`],
    /// never an empty string.
    pub async fn complete(&self, request: &ProviderRequest) -> Result<String, RelayError> {
        let call = self.resolve(request)?;
        let provider = call.provider();

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = %provider,
            gen_ai.request.model = %call.model,
            gen_ai.request.stream = false,
        );

        async move {
            let upstream = call.adapter.build_request(&call.model, &request.message, false);
            let response = self.send_checked(provider, upstream).await?;

            let bytes = response
                .collect()
                .await
                .map_err(|cause| RelayError::upstream(provider, cause))?;

            let body: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
                RelayError::upstream(provider, UpstreamCause::Malformed(e.to_string()))
            })?;

            match call.adapter.extract_reply(&body) {
                Some(reply) => Ok(reply),
                None => {
                    debug!(provider = %provider, "no reply text in upstream body, using fallback");
                    Ok(NO_RESPONSE_FALLBACK.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Send a streaming request and return the reply as text fragments.
    ///
    /// Connection failures and non-2xx statuses are reported here, before
    /// any fragment is produced; failures after that surface as an error
    /// item in the stream.
    pub async fn stream(&self, request: &ProviderRequest) -> Result<FragmentStream, RelayError> {
        let call = self.resolve(request)?;
        let provider = call.provider();

        let span = info_span!(
            "gen_ai.stream",
            gen_ai.system = %provider,
            gen_ai.request.model = %call.model,
            gen_ai.request.stream = true,
        );

        async move {
            let upstream = call.adapter.build_request(&call.model, &request.message, true);
            let response = self.send_checked(provider, upstream).await?;
            Ok(fragment_stream(call.adapter.clone(), response.body))
        }
        .instrument(span)
        .await
    }

    /// Send through the transport, turning non-2xx statuses into errors.
    async fn send_checked(
        &self,
        provider: ProviderKind,
        request: arena_types::llm::UpstreamRequest,
    ) -> Result<UpstreamResponse, RelayError> {
        debug!(provider = %provider, url = %request.url, "sending upstream request");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|cause| RelayError::upstream(provider, cause))?;

        if response.is_success() {
            return Ok(response);
        }

        let status = response.status;
        let body = match response.collect().await {
            Ok(body) => body,
            Err(cause) => {
                debug!(provider = %provider, status, %cause, "could not read upstream error body");
                Vec::new()
            }
        };
        let mut excerpt = String::from_utf8_lossy(&body).into_owned();
        if excerpt.len() > ERROR_BODY_EXCERPT {
            let mut cut = ERROR_BODY_EXCERPT;
            while !excerpt.is_char_boundary(cut) {
                cut -= 1;
            }
            excerpt.truncate(cut);
        }

        Err(RelayError::upstream(
            provider,
            UpstreamCause::Status {
                status,
                body: excerpt,
            },
        ))
    }
}
