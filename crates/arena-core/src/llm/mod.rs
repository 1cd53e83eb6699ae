//! Provider relay abstractions.
//!
//! - `ProviderAdapter`: per-vendor request construction and reply extraction
//! - `UpstreamTransport`: the network seam that actually sends requests
//! - `ProviderRelay`: adapter selection, defaults, and reply normalization

pub mod adapter;
pub mod relay;
pub mod sse;
pub mod transport;
