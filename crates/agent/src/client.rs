use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Response from a Collector call: `(status, body)`. `status == 0`
/// means no HTTP response was observed at all (connect/timeout/DNS
/// failure) — a transport failure, treated uniformly with any other
/// non-202 by the runtime. The body is populated whenever the
/// response parses as JSON, even on non-2xx, so callers can read the
/// standard result envelope off an error response.
pub type CollectorResponse = (u16, Option<Value>);

/// Stateless HTTP client for the Collector control-plane surface.
/// Cheap to clone: wraps a single shared `reqwest::Client` so
/// connection pooling is reused across calls, while the wrapper
/// itself carries no per-call state (each method builds its request
/// fresh), matching the "stateless" contract.
#[derive(Clone)]
pub struct CollectorClient {
    http: Client,
    api_key: Option<String>,
}

impl CollectorClient {
    pub fn new(api_key: Option<String>) -> anyhow::Result<Self> {
        let http = Client::builder().build()?;
        Ok(CollectorClient { http, api_key })
    }

    pub async fn health(&self, base_url: &str, timeout: Duration) -> CollectorResponse {
        self.call_get(&format!("{base_url}/health"), timeout).await
    }

    pub async fn announce(&self, base_url: &str, payload: &Value, timeout: Duration) -> CollectorResponse {
        self.call_post(&format!("{base_url}/announce"), payload, timeout).await
    }

    pub async fn policy(&self, base_url: &str, service_name: &str, environment: &str, timeout: Duration) -> CollectorResponse {
        let url = format!("{base_url}/policy?serviceName={service_name}&environment={environment}");
        self.call_get(&url, timeout).await
    }

    pub async fn heartbeat(&self, base_url: &str, payload: &Value, timeout: Duration) -> CollectorResponse {
        self.call_post(&format!("{base_url}/heartbeat"), payload, timeout).await
    }

    pub async fn events_batch(&self, base_url: &str, payload: &Value, timeout: Duration) -> CollectorResponse {
        self.call_post(&format!("{base_url}/events:batch"), payload, timeout).await
    }

    async fn call_get(&self, url: &str, timeout: Duration) -> CollectorResponse {
        let mut request = self.http.get(url).header("Accept", "application/json").timeout(timeout);
        if let Some(api_key) = &self.api_key {
            request = request.header("X-API-Key", api_key);
        }
        self.send(request).await
    }

    async fn call_post(&self, url: &str, payload: &Value, timeout: Duration) -> CollectorResponse {
        let mut request = self
            .http
            .post(url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .json(payload);
        if let Some(api_key) = &self.api_key {
            request = request.header("X-API-Key", api_key);
        }
        self.send(request).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> CollectorResponse {
        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.json::<Value>().await.ok();
                (status, body)
            }
            Err(err) => {
                debug!(error = %err, "collector request failed at transport level");
                (0, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_health_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "version": "1.0.0"})))
            .mount(&server)
            .await;

        let client = CollectorClient::new(None).unwrap();
        let (status, body) = client.health(&server.uri(), Duration::from_secs(1)).await;
        assert_eq!(status, 200);
        assert_eq!(body.unwrap()["ok"], json!(true));
    }

    #[tokio::test]
    async fn test_transport_failure_returns_zero_status() {
        let client = CollectorClient::new(None).unwrap();
        let (status, body) = client
            .health("http://127.0.0.1:1", Duration::from_millis(200))
            .await;
        assert_eq!(status, 0);
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_api_key_header_sent_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .and(header("X-API-Key", "secret-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let client = CollectorClient::new(Some("secret-key".to_string())).unwrap();
        let (status, _) = client.health(&server.uri(), Duration::from_secs(1)).await;
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn test_non_2xx_still_returns_parsed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/policy"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "result": {"status": "rejected", "requestId": "r1", "error": {"code": "policy_not_found", "message": "no policy"}}
            })))
            .mount(&server)
            .await;

        let client = CollectorClient::new(None).unwrap();
        let (status, body) = client.policy(&server.uri(), "nope", "local", Duration::from_secs(1)).await;
        assert_eq!(status, 404);
        assert_eq!(body.unwrap()["result"]["error"]["code"], json!("policy_not_found"));
    }
}
