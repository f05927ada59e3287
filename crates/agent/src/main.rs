use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use arecibo_agent::{AgentConfig, AgentRuntime, IngestQueue, IngestServer};

#[tokio::main]
async fn main() -> Result<()> {
    arecibo_common::init_tracing();

    let config = AgentConfig::from_env().context("loading agent configuration")?;
    info!(service_name = %config.service_name, environment = %config.environment, "agent starting");

    let queue = Arc::new(IngestQueue::new(config.max_event_queue_depth));

    let ingest_server = if config.ingest_socket_enabled {
        match IngestServer::start(&config.ingest_socket_path, config.ingest_socket_buffer_bytes, queue.clone()).await
        {
            Ok(server) => Some(server),
            Err(err) => {
                warn!(error = %err, "failed to start ingest socket, continuing without local ingest");
                None
            }
        }
    } else {
        None
    };

    let stop = Arc::new(AtomicBool::new(false));
    let mut runtime = AgentRuntime::new(config, queue, stop.clone()).context("building agent runtime")?;

    runtime.bootstrap().await;

    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        stop.store(true, Ordering::SeqCst);
    });

    runtime.run(ingest_server).await;

    info!("agent exiting");
    Ok(())
}

async fn wait_for_shutdown_signal() {
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
