use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use jsonschema::JSONSchema;
use serde_json::Value;

/// Loads and compiles the JSON-schema documents under `schemas/`,
/// The schema files themselves are opaque data — this registry never
/// hand-encodes their validation rules, it only loads and runs them.
pub struct SchemaRegistry {
    validators: HashMap<&'static str, JSONSchema>,
    // Kept alive because `JSONSchema` borrows from the value it was
    // compiled from in some jsonschema versions' internal caching; we
    // hold owned copies to be safe against lifetime surprises.
    #[allow(dead_code)]
    documents: HashMap<&'static str, Value>,
}

impl SchemaRegistry {
    pub fn load(schema_dir: &str) -> Result<Self> {
        let base = Path::new(schema_dir);
        let mut validators = HashMap::new();
        let mut documents = HashMap::new();

        let entries: &[(&str, &str)] = &[
            ("result", "api/result.1.0.0.json"),
            ("policy_response", "policy/policy-response.1.0.0.json"),
            ("announce", "ingest/announce.1.0.0.json"),
            ("heartbeat", "ingest/heartbeat.1.0.0.json"),
            ("events_batch", "ingest/events-batch.1.0.0.json"),
        ];

        for (name, relative_path) in entries {
            let path = base.join(relative_path);
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading schema {} from {}", name, path.display()))?;
            let document: Value =
                serde_json::from_str(&raw).with_context(|| format!("parsing schema {name} as JSON"))?;
            let compiled = JSONSchema::compile(&document)
                .map_err(|err| anyhow::anyhow!("compiling schema {name}: {err}"))?;
            validators.insert(*name, compiled);
            documents.insert(*name, document);
        }

        Ok(SchemaRegistry { validators, documents })
    }

    /// Validate `payload` against the named schema, returning a list
    /// of human-readable error messages (empty if valid).
    pub fn validate(&self, name: &str, payload: &Value) -> Vec<String> {
        let Some(validator) = self.validators.get(name) else {
            return vec![format!("unknown schema '{name}'")];
        };
        match validator.validate(payload) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.map(|err| err.to_string()).collect(),
        }
    }
}
