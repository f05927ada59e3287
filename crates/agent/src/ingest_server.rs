use std::path::Path;
use std::sync::Arc;

use arecibo_domain::Event;
use chrono::Utc;
use tokio::net::UnixDatagram;
use tracing::{debug, info, warn};

use crate::queue::IngestQueue;

/// Listens on a local Unix datagram socket, normalizes each datagram
/// into an [`Event`], and pushes it onto the shared [`IngestQueue`].
/// One receive worker, spawned once at startup; stopped by closing
/// the socket, which unblocks `recv_from` with an OS error.
pub struct IngestServer {
    handle: tokio::task::JoinHandle<()>,
}

impl IngestServer {
    /// Bind the socket and spawn the receive loop: ensure the parent
    /// directory exists, remove any stale socket file at the path,
    /// bind, then widen permissions so any local
    /// user/process can write to it.
    pub async fn start(path: &str, buffer_bytes: usize, queue: Arc<IngestQueue>) -> anyhow::Result<Self> {
        let socket_path = Path::new(path);
        if let Some(parent) = socket_path.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
        let _ = tokio::fs::remove_file(socket_path).await;

        let socket = UnixDatagram::bind(socket_path)?;
        Self::widen_permissions(socket_path).await;

        info!(path = %path, "ingest socket bound");

        let handle = tokio::spawn(Self::receive_loop(socket, buffer_bytes, queue));
        Ok(IngestServer { handle })
    }

    #[cfg(unix)]
    async fn widen_permissions(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        if let Err(err) = tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o666)).await {
            warn!(error = %err, "failed to widen ingest socket permissions");
        }
    }

    #[cfg(not(unix))]
    async fn widen_permissions(_path: &Path) {}

    async fn receive_loop(socket: UnixDatagram, buffer_bytes: usize, queue: Arc<IngestQueue>) {
        let mut buf = vec![0u8; buffer_bytes];
        loop {
            let n = match socket.recv(&mut buf).await {
                Ok(n) => n,
                Err(err) => {
                    info!(error = %err, "ingest socket closed, receive loop exiting");
                    break;
                }
            };

            let text = String::from_utf8_lossy(&buf[..n]);
            let raw: serde_json::Value = match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(_) => {
                    debug!("dropped malformed ingest datagram");
                    continue;
                }
            };

            match Event::normalize(&raw, now_rfc3339) {
                Some(event) => queue.push(event).await,
                None => debug!("dropped non-object ingest datagram"),
            }
        }
    }

    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}

fn now_rfc3339() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
