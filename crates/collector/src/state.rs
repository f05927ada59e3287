use std::sync::Arc;

use crate::config::Settings;
use crate::policy_store::PolicyStore;
use crate::schema::SchemaRegistry;

/// Shared, read-only application state handed to every handler via
/// axum's `State` extractor. Everything here is constructed once at
/// startup and never mutated: the collector is request-parallel,
/// each request independent of every other.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub schemas: Arc<SchemaRegistry>,
    pub policy_store: Arc<PolicyStore>,
}
