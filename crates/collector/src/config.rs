use std::collections::HashSet;
use std::env;

use anyhow::{Context, Result};

const POLICY_TTL_MIN_SEC: u64 = 5;

/// Collector configuration loaded from the environment.
///
/// The secret backend that would normally supply `api_keys` (a vault
/// or similar) is out of scope here — this loads the key set
/// directly from `ARECIBO_API_KEYS`, the same local-dev/test fallback
/// path taken when no secret backend is wired up.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_keys: HashSet<String>,
    pub force_go_dark: bool,
    pub force_go_dark_on: HashSet<String>,
    pub policy_ttl_sec: u64,
    pub policy_file: Option<String>,
    pub host: String,
    pub port: u16,
    pub schema_dir: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let keys_raw = env::var("ARECIBO_API_KEYS").unwrap_or_else(|_| "local-dev-key".to_string());
        let api_keys: HashSet<String> = keys_raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if api_keys.is_empty() {
            anyhow::bail!("ARECIBO_API_KEYS resolved to an empty key set");
        }

        let force_go_dark = env::var("ARECIBO_FORCE_GO_DARK")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        let force_go_dark_on: HashSet<String> = env::var("ARECIBO_FORCE_GO_DARK_ON")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let policy_ttl_sec = env::var("ARECIBO_POLICY_TTL_SEC")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(60)
            .max(POLICY_TTL_MIN_SEC);

        let policy_file = env::var("ARECIBO_POLICY_FILE").ok().filter(|s| !s.is_empty());

        let host = env::var("ARECIBO_COLLECTOR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("ARECIBO_COLLECTOR_PORT")
            .ok()
            .map(|raw| raw.parse::<u16>())
            .transpose()
            .context("ARECIBO_COLLECTOR_PORT must be a valid port number")?
            .unwrap_or(8080);

        let schema_dir = env::var("ARECIBO_SCHEMA_DIR").unwrap_or_else(|_| "schemas".to_string());

        Ok(Settings {
            api_keys,
            force_go_dark,
            force_go_dark_on,
            policy_ttl_sec,
            policy_file,
            host,
            port,
            schema_dir,
        })
    }

    /// Whether a `GO_DARK` directive should be attached to a response
    /// for the named endpoint, per the `force_go_dark`/`force_go_dark_on`
    /// operator knobs.
    pub fn go_dark_directives_for(&self, endpoint: &str) -> Vec<arecibo_domain::Directive> {
        if self.force_go_dark || self.force_go_dark_on.contains(endpoint) {
            vec![arecibo_domain::Directive::go_dark()]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_dark_directives_empty_by_default() {
        let settings = Settings {
            api_keys: HashSet::from(["k".to_string()]),
            force_go_dark: false,
            force_go_dark_on: HashSet::new(),
            policy_ttl_sec: 60,
            policy_file: None,
            host: "0.0.0.0".to_string(),
            port: 8080,
            schema_dir: "schemas".to_string(),
        };
        assert!(settings.go_dark_directives_for("heartbeat").is_empty());
    }

    #[test]
    fn test_force_go_dark_applies_to_all_endpoints() {
        let settings = Settings {
            api_keys: HashSet::from(["k".to_string()]),
            force_go_dark: true,
            force_go_dark_on: HashSet::new(),
            policy_ttl_sec: 60,
            policy_file: None,
            host: "0.0.0.0".to_string(),
            port: 8080,
            schema_dir: "schemas".to_string(),
        };
        assert_eq!(settings.go_dark_directives_for("events")[0].directive_type, "GO_DARK");
    }

    #[test]
    fn test_force_go_dark_on_is_endpoint_scoped() {
        let settings = Settings {
            api_keys: HashSet::from(["k".to_string()]),
            force_go_dark: false,
            force_go_dark_on: HashSet::from(["events".to_string()]),
            policy_ttl_sec: 60,
            policy_file: None,
            host: "0.0.0.0".to_string(),
            port: 8080,
            schema_dir: "schemas".to_string(),
        };
        assert!(settings.go_dark_directives_for("events")[0].directive_type == "GO_DARK");
        assert!(settings.go_dark_directives_for("heartbeat").is_empty());
    }
}
