//! The Arecibo Collector: the central HTTP endpoint Agents announce
//! to, fetch policy from, and ship telemetry into. See
//! `crates/collector/src/main.rs` for the server entrypoint.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod policy_store;
pub mod request_id;
pub mod schema;
pub mod state;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use config::Settings;
pub use state::AppState;

/// Assemble the Collector's router. Shared by `main.rs` and the
/// workspace's `tests` crate, which drives it in-process via
/// `tower::ServiceExt::oneshot` rather than over a real socket.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::get_health))
        .route("/announce", post(handlers::announce::post_announce))
        .route("/policy", get(handlers::policy::get_policy))
        .route("/heartbeat", post(handlers::heartbeat::post_heartbeat))
        .route("/events:batch", post(handlers::events_batch::post_events_batch))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_id::assign_request_id)),
        )
}
