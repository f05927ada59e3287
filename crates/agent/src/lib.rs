//! The Arecibo Agent: a sidecar that collects local telemetry events
//! and forwards them to a Collector, steered by out-of-band
//! directives. See `crates/agent/src/runtime.rs` for the control loop.

pub mod client;
pub mod config;
pub mod directives;
pub mod ingest_server;
pub mod queue;
pub mod runtime;

pub use client::CollectorClient;
pub use config::AgentConfig;
pub use ingest_server::IngestServer;
pub use queue::IngestQueue;
pub use runtime::{AgentRuntime, RuntimeState};
