use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Severity of an ingested event.
///
/// Unrecognized values fall back to `Info` at the ingest boundary
/// rather than being rejected — see [`Event::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Info
    }
}

impl Severity {
    fn from_str_lossy(raw: &str) -> Self {
        match raw {
            "debug" => Severity::Debug,
            "warn" => Severity::Warn,
            "error" => Severity::Error,
            _ => Severity::Info,
        }
    }
}

/// The unit of telemetry work flowing through the agent.
///
/// `ts` is carried as the exact RFC3339 string produced at ingest time
/// rather than re-parsed into a `DateTime` — the agent never inspects
/// it, it only forwards it, so there's nothing to gain from parsing
/// and a parse failure would be one more way to drop a good event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub ts: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub severity: Severity,
    pub payload: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

impl Event {
    /// Normalize a raw ingest datagram into an `Event`, per the
    /// ingest datagram contract: `ts` defaults to now, `type` defaults
    /// to `"app.event"`, `severity` defaults to `info`, `payload`
    /// defaults to the whole input object, and `tags` is included only
    /// when it is an object of strings.
    pub fn normalize(raw: &serde_json::Value, now: impl FnOnce() -> String) -> Option<Self> {
        let obj = raw.as_object()?;

        let ts = obj
            .get("ts")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(now);

        let event_type = obj
            .get("type")
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| "app.event".to_string());

        let severity = obj
            .get("severity")
            .and_then(|v| v.as_str())
            .map(Severity::from_str_lossy)
            .unwrap_or_default();

        let payload = obj.get("payload").cloned().unwrap_or_else(|| raw.clone());

        let tags = obj.get("tags").and_then(|v| v.as_object()).map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect::<BTreeMap<_, _>>()
        });

        Some(Event {
            ts,
            event_type,
            severity,
            payload,
            tags,
        })
    }
}
