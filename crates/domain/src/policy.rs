use serde::{Deserialize, Serialize};

/// The subset of an agent's in-memory policy state that the control
/// loop mutates after each successful policy fetch or directive.
///
/// `session_id` is empty until the first successful policy fetch — an
/// empty session id is what makes the flush handler drop a batch
/// rather than send it with an invalid identity (spec §4.6 step 5).
#[derive(Debug, Clone)]
pub struct PolicyState {
    pub session_id: String,
    pub policy_version: String,
    pub enabled: bool,
    pub heartbeat_interval_sec: u64,
    pub max_batch_size: usize,
    pub ttl_sec: u64,
}

impl Default for PolicyState {
    fn default() -> Self {
        Self {
            session_id: String::new(),
            policy_version: String::new(),
            enabled: true,
            heartbeat_interval_sec: 30,
            max_batch_size: 1000,
            ttl_sec: 60,
        }
    }
}

/// The policy document as returned inside a policy-response envelope.
///
/// Field names match the wire contract exactly (camelCase), since this
/// struct is serialized directly by the collector and deserialized
/// directly by the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    pub policy_version: String,
    pub service_name: String,
    pub environment: String,
    pub enabled: bool,
    pub default_sample_rate: f64,
    pub heartbeat_interval_sec: u64,
    pub max_event_queue_depth: usize,
    pub max_batch_size: usize,
    #[serde(default)]
    pub event_overrides: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub redaction_rules: Vec<String>,
}

/// The bare policy-response envelope returned by `GET /policy`. This
/// is the one Collector response shape that does not go through the
/// `{result: {...}}` wrapper — see spec §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResponse {
    pub schema_version: String,
    pub agent_session_id: String,
    pub fetched_at: String,
    pub ttl_sec: u64,
    pub policy: PolicyDocument,
}

impl PolicyState {
    /// Apply a freshly fetched policy-response to this state.
    pub fn apply_response(&mut self, response: &PolicyResponse) {
        self.session_id = response.agent_session_id.clone();
        self.ttl_sec = response.ttl_sec;
        self.policy_version = response.policy.policy_version.clone();
        self.enabled = response.policy.enabled;
        self.heartbeat_interval_sec = response.policy.heartbeat_interval_sec;
        self.max_batch_size = response.policy.max_batch_size;
    }
}
