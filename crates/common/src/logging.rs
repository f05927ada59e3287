//! Logging and tracing setup shared by the agent and the collector.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize compact, human-readable tracing output.
///
/// Used by the agent, whose logs are usually tailed directly on the
/// host it's sidecarring rather than shipped to a log aggregator.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true) // Show module path
                .with_level(true) // Show log level
                .with_thread_ids(true) // Show thread IDs
                .with_file(true) // Show file and line
                .compact(), // Compact format
        )
        .init();
}

/// Initialize JSON-formatted tracing output.
///
/// Used by the collector, which runs as a long-lived service behind a
/// log aggregator.
pub fn init_tracing_json() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json() // JSON format
                .with_target(true)
                .with_level(true)
                .with_current_span(true),
        )
        .init();
}
