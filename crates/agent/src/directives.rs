use arecibo_domain::{Directive, DirectiveKind};
use tracing::{info, warn};

use crate::runtime::RuntimeState;

/// Apply a list of directives in order, each observing the effects of
/// the ones before it. Applying the same directive twice is
/// idempotent — every branch below sets state to an absolute value
/// rather than toggling relative to the current one.
pub fn apply_directives(state: &mut RuntimeState, directives: &[Directive]) {
    for directive in directives {
        apply_one(state, directive);
    }
}

fn apply_one(state: &mut RuntimeState, directive: &Directive) {
    match DirectiveKind::from(directive.directive_type.as_str()) {
        DirectiveKind::GoDark => {
            state.go_dark = true;
            info!("directive applied: GO_DARK");
        }
        DirectiveKind::Resume => {
            state.go_dark = false;
            info!("directive applied: RESUME");
        }
        DirectiveKind::RefreshPolicy => {
            state.policy_refresh_requested = true;
            info!("directive applied: REFRESH_POLICY");
        }
        DirectiveKind::SetHeartbeatInterval => match parse_interval(directive) {
            Some(value) => {
                state.policy.heartbeat_interval_sec = value.max(state.heartbeat_min_interval_sec);
                info!(interval = state.policy.heartbeat_interval_sec, "directive applied: SET_HEARTBEAT_INTERVAL");
            }
            None => warn!(value = ?directive.value, "SET_HEARTBEAT_INTERVAL directive had non-integer value, ignored"),
        },
        DirectiveKind::FlushStats => {
            info!(
                received = state.counters_snapshot.received_total,
                sent = state.counters.events_sent_total,
                dropped = state.counters_snapshot.dropped_total,
                "directive applied: FLUSH_STATS"
            );
        }
        DirectiveKind::Unknown(kind) => {
            warn!(kind = %kind, "ignoring unrecognized directive");
        }
    }
}

fn parse_interval(directive: &Directive) -> Option<u64> {
    match directive.value.as_ref()? {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse::<u64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> RuntimeState {
        RuntimeState::new(5)
    }

    #[test]
    fn test_go_dark_then_resume() {
        let mut s = state();
        apply_directives(&mut s, &[Directive::go_dark()]);
        assert!(s.go_dark);
        apply_directives(&mut s, &[Directive {
            directive_type: "RESUME".to_string(),
            value: None,
            ttl_sec: None,
        }]);
        assert!(!s.go_dark);
    }

    #[test]
    fn test_go_dark_is_idempotent() {
        let mut s = state();
        apply_directives(&mut s, &[Directive::go_dark(), Directive::go_dark()]);
        assert!(s.go_dark);
    }

    #[test]
    fn test_set_heartbeat_interval_respects_floor() {
        let mut s = state();
        let directive = Directive {
            directive_type: "SET_HEARTBEAT_INTERVAL".to_string(),
            value: Some(json!(2)),
            ttl_sec: None,
        };
        apply_directives(&mut s, &[directive]);
        assert_eq!(s.policy.heartbeat_interval_sec, 5);
    }

    #[test]
    fn test_set_heartbeat_interval_ignores_non_integer() {
        let mut s = state();
        s.policy.heartbeat_interval_sec = 60;
        let directive = Directive {
            directive_type: "SET_HEARTBEAT_INTERVAL".to_string(),
            value: Some(json!("not-a-number")),
            ttl_sec: None,
        };
        apply_directives(&mut s, &[directive]);
        assert_eq!(s.policy.heartbeat_interval_sec, 60);
    }

    #[test]
    fn test_unknown_directive_is_ignored() {
        let mut s = state();
        let directive = Directive {
            directive_type: "SOMETHING_NEW".to_string(),
            value: None,
            ttl_sec: None,
        };
        apply_directives(&mut s, &[directive]);
        assert!(!s.go_dark);
    }

    #[test]
    fn test_later_directive_observes_earlier_effect() {
        let mut s = state();
        apply_directives(&mut s, &[
            Directive::go_dark(),
            Directive { directive_type: "RESUME".to_string(), value: None, ttl_sec: None },
        ]);
        assert!(!s.go_dark);
    }
}
