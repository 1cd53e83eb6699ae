//! Observability setup for Chat Arena: structured logging through
//! `tracing`, with optional OpenTelemetry span export.

pub mod tracing_setup;
