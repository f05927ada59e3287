use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use arecibo_collector::policy_store::PolicyStore;
use arecibo_collector::schema::SchemaRegistry;
use arecibo_collector::{AppState, Settings, build_router};

#[tokio::main]
async fn main() -> Result<()> {
    arecibo_common::init_tracing_json();

    let settings = Settings::from_env().context("loading collector settings")?;
    info!(host = %settings.host, port = settings.port, "collector settings loaded");

    let schemas = SchemaRegistry::load(&settings.schema_dir).context("loading schema registry")?;
    let policy_store =
        PolicyStore::from_defaults_and_file(settings.policy_file.as_deref()).context("loading policy store")?;

    let addr = format!("{}:{}", settings.host, settings.port);

    let state = AppState {
        settings: Arc::new(settings),
        schemas: Arc::new(schemas),
        policy_store: Arc::new(policy_store),
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("binding {addr}"))?;
    info!(%addr, "collector listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("collector server loop")?;

    info!("collector shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("received ctrl-c, shutting down");
        },
        _ = terminate => {
            warn!("received terminate signal, shutting down");
        },
    }
}
