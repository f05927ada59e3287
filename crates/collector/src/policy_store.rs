use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use arecibo_domain::PolicyDocument;
use chrono::Utc;
use serde_json::Map;

/// In-memory `(service, environment) -> policy document` mapping, one
/// key per `"<service>:<environment>"` pair plus an optional
/// `"<service>:*"` wildcard. Read-only after process startup, so no
/// locking is required.
pub struct PolicyStore {
    policies: HashMap<String, PolicyDocument>,
}

impl PolicyStore {
    pub fn new(policies: HashMap<String, PolicyDocument>) -> Self {
        PolicyStore { policies }
    }

    /// Seed with a baseline demo policy, optionally merging a JSON
    /// file of overrides keyed the same way
    /// (`"service:environment"` -> policy document).
    pub fn from_defaults_and_file(overrides_path: Option<&str>) -> Result<Self> {
        let mut policies = default_policies();
        if let Some(path) = overrides_path {
            let overrides = load_policy_overrides(path)?;
            policies.extend(overrides);
        }
        Ok(PolicyStore::new(policies))
    }

    /// §4.9: exact key, then the `"<service>:*"` wildcard, else `None`.
    pub fn lookup(&self, service_name: &str, environment: &str) -> Option<&PolicyDocument> {
        let key = format!("{service_name}:{environment}");
        if let Some(document) = self.policies.get(&key) {
            return Some(document);
        }
        let wildcard_key = format!("{service_name}:*");
        self.policies.get(&wildcard_key)
    }
}

fn default_policies() -> HashMap<String, PolicyDocument> {
    let mut policies = HashMap::new();
    policies.insert(
        "demo-service:local".to_string(),
        PolicyDocument {
            policy_version: "1.0.0".to_string(),
            service_name: "demo-service".to_string(),
            environment: "local".to_string(),
            enabled: true,
            default_sample_rate: 1.0,
            heartbeat_interval_sec: 30,
            max_event_queue_depth: 10_000,
            max_batch_size: 1000,
            event_overrides: Map::new(),
            redaction_rules: Vec::new(),
        },
    );
    policies
}

fn load_policy_overrides(path: &str) -> Result<HashMap<String, PolicyDocument>> {
    let raw = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("reading policy overrides file {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing policy overrides file {path} as JSON"))
}

/// Build the `fetchedAt` timestamp for a freshly served policy
/// response, RFC3339 second-precision UTC with a trailing `Z`.
pub fn fetched_at_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
