use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

const HEARTBEAT_MIN_INTERVAL_SEC: u64 = 5;
const EVENTS_FLUSH_MIN_INTERVAL_SEC: u64 = 1;
const MAX_EVENT_QUEUE_DEPTH_MIN: usize = 1;
const MAX_BATCH_SIZE_MIN: usize = 1;
const INGEST_SOCKET_BUFFER_BYTES_MIN: usize = 1024;

/// Agent configuration loaded from the environment, with floors
/// applied unconditionally — no directive or policy value can ever
/// push an effective setting below these.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub collector_candidates: Vec<String>,
    pub api_key: Option<String>,
    pub probe_timeout_sec: u64,
    pub http_timeout_sec: u64,
    pub heartbeat_min_interval_sec: u64,
    pub policy_refresh_jitter_sec: u64,
    pub events_flush_interval_sec: u64,
    pub max_event_queue_depth: usize,
    pub max_batch_size: usize,
    pub ingest_socket_enabled: bool,
    pub ingest_socket_path: String,
    pub ingest_socket_buffer_bytes: usize,

    pub service_name: String,
    pub environment: String,
    pub hostname: String,
    pub git_commit: Option<String>,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let collector_candidates = Self::read_candidates()?;

        let api_key = env::var("ARECIBO_API_KEY").ok();

        let probe_timeout_sec = parse_env_u64("ARECIBO_PROBE_TIMEOUT_SEC", 2)?;
        let http_timeout_sec = parse_env_u64("ARECIBO_HTTP_TIMEOUT_SEC", 10)?;

        let heartbeat_min_interval_sec =
            parse_env_u64("ARECIBO_HEARTBEAT_INTERVAL_SEC", 30)?.max(HEARTBEAT_MIN_INTERVAL_SEC);
        let policy_refresh_jitter_sec = parse_env_u64("ARECIBO_POLICY_REFRESH_JITTER_SEC", 5)?;
        let events_flush_interval_sec =
            parse_env_u64("ARECIBO_EVENTS_FLUSH_INTERVAL_SEC", 5)?.max(EVENTS_FLUSH_MIN_INTERVAL_SEC);
        let max_event_queue_depth =
            parse_env_usize("ARECIBO_MAX_EVENT_QUEUE_DEPTH", 10_000)?.max(MAX_EVENT_QUEUE_DEPTH_MIN);
        let max_batch_size = parse_env_usize("ARECIBO_MAX_BATCH_SIZE", 500)?.max(MAX_BATCH_SIZE_MIN);

        let ingest_socket_enabled = env::var("ARECIBO_INGEST_SOCKET_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        let ingest_socket_path = env::var("ARECIBO_INGEST_SOCKET_PATH")
            .unwrap_or_else(|_| "/run/arecibo/ingest.sock".to_string());
        let ingest_socket_buffer_bytes =
            parse_env_usize("ARECIBO_INGEST_SOCKET_BUFFER_BYTES", 65535)?.max(INGEST_SOCKET_BUFFER_BYTES_MIN);

        let service_name = env::var("SERVICE_NAME").unwrap_or_else(|_| "unknown-service".to_string());
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string());
        let hostname = env::var("HOSTNAME").unwrap_or_else(|_| "unknown-host".to_string());
        let git_commit = env::var("GIT_COMMIT").ok();

        Ok(AgentConfig {
            collector_candidates,
            api_key,
            probe_timeout_sec,
            http_timeout_sec,
            heartbeat_min_interval_sec,
            policy_refresh_jitter_sec,
            events_flush_interval_sec,
            max_event_queue_depth,
            max_batch_size,
            ingest_socket_enabled,
            ingest_socket_path,
            ingest_socket_buffer_bytes,
            service_name,
            environment,
            hostname,
            git_commit,
        })
    }

    fn read_candidates() -> Result<Vec<String>> {
        let mut candidates: Vec<String> = Vec::new();

        if let Ok(pinned) = env::var("ARECIBO_COLLECTOR_URL") {
            candidates.push(pinned);
        }

        if let Ok(raw) = env::var("ARECIBO_COLLECTOR_CANDIDATES") {
            for part in raw.split(',') {
                let trimmed = part.trim().trim_end_matches('/');
                if !trimmed.is_empty() {
                    candidates.push(trimmed.to_string());
                }
            }
        }

        let mut deduped = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !deduped.contains(&candidate) {
                deduped.push(candidate);
            }
        }
        Ok(deduped)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_sec)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_sec)
    }
}

fn parse_env_u64(key: &str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(raw) => raw.parse::<u64>().with_context(|| format!("{key} must be a valid integer")),
        Err(_) => Ok(default),
    }
}

fn parse_env_usize(key: &str, default: usize) -> Result<usize> {
    match env::var(key) {
        Ok(raw) => raw.parse::<usize>().with_context(|| format!("{key} must be a valid integer")),
        Err(_) => Ok(default),
    }
}
