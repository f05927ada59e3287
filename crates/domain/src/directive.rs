use serde::{Deserialize, Serialize};

/// An out-of-band instruction attached to an otherwise-ordinary
/// Collector response, steering agent behavior at runtime.
///
/// `type` is kept as a raw string rather than an enum on the wire
/// struct: the collector and agent must each tolerate directive types
/// neither of them recognizes yet (unknown types are logged and
/// ignored per spec §4.7), which a closed enum with `#[serde(deny...)]`
/// would reject instead of skip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Directive {
    #[serde(rename = "type")]
    pub directive_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(rename = "ttlSec", skip_serializing_if = "Option::is_none")]
    pub ttl_sec: Option<u64>,
}

impl Directive {
    pub fn go_dark() -> Self {
        Directive {
            directive_type: "GO_DARK".to_string(),
            value: None,
            ttl_sec: None,
        }
    }
}

/// The closed set of directive types the agent understands. Parsed
/// from [`Directive::directive_type`] at apply-time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveKind {
    GoDark,
    Resume,
    RefreshPolicy,
    SetHeartbeatInterval,
    FlushStats,
    Unknown(String),
}

impl From<&str> for DirectiveKind {
    fn from(raw: &str) -> Self {
        match raw {
            "GO_DARK" => DirectiveKind::GoDark,
            "RESUME" => DirectiveKind::Resume,
            "REFRESH_POLICY" => DirectiveKind::RefreshPolicy,
            "SET_HEARTBEAT_INTERVAL" => DirectiveKind::SetHeartbeatInterval,
            "FLUSH_STATS" => DirectiveKind::FlushStats,
            other => DirectiveKind::Unknown(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_kind_from_str() {
        assert_eq!(DirectiveKind::from("GO_DARK"), DirectiveKind::GoDark);
        assert_eq!(
            DirectiveKind::from("NOT_A_REAL_DIRECTIVE"),
            DirectiveKind::Unknown("NOT_A_REAL_DIRECTIVE".to_string())
        );
    }

    #[test]
    fn test_directive_deserializes_unknown_type_without_error() {
        let raw = serde_json::json!({"type": "SOMETHING_NEW", "value": 3});
        let directive: Directive = serde_json::from_value(raw).unwrap();
        assert_eq!(directive.directive_type, "SOMETHING_NEW");
        assert_eq!(DirectiveKind::from(directive.directive_type.as_str()), DirectiveKind::Unknown("SOMETHING_NEW".to_string()));
    }
}
