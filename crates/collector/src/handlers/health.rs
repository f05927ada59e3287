use axum::Json;
use serde_json::{Value, json};

/// `GET /health`, unauthenticated, consulted by the agent's collector
/// selection probe. A bare `{ok, version}` — no result envelope, since
/// bootstrap health checks happen before any session exists to attach
/// a request id to.
pub async fn get_health() -> Json<Value> {
    Json(json!({"ok": true, "version": env!("CARGO_PKG_VERSION")}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_ok() {
        let Json(body) = get_health().await;
        assert_eq!(body["ok"], json!(true));
    }
}
