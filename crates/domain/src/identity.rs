use serde::{Deserialize, Serialize};

/// Identity block carried in `announce` and echoed in every heartbeat,
/// letting the collector attribute a session without trusting the
/// agent's self-reported session id alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub service_name: String,
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    pub instance_id: String,
    pub startup_ts: String,
    pub hostname: String,
}

/// Process-level facts reported alongside [`Identity`] in `announce`.
/// `agent_pid`/`agent_version`/`rust_version` stand in for the
/// original's `pythonVersion` field — the closest Rust-native
/// equivalent of "what runtime is this agent built against".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeInfo {
    pub agent_pid: u32,
    pub agent_version: String,
    pub rust_version: String,
}
