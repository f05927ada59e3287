use axum::Json;
use axum::extract::{Query, State};
use arecibo_domain::{PolicyResponse, derive_session_id};
use serde::Deserialize;
use tracing::info;

use crate::auth::ApiKeyAuth;
use crate::error::AppError;
use crate::policy_store::fetched_at_now;
use crate::request_id::RequestId;
use crate::state::AppState;

use super::validate_outgoing;

#[derive(Debug, Deserialize)]
pub struct PolicyQuery {
    #[serde(rename = "serviceName")]
    pub service_name: String,
    pub environment: String,
}

/// `GET /policy`: the one collector response never wrapped in a
/// `result` envelope — a bare [`PolicyResponse`] on success, the
/// usual envelope on error.
pub async fn get_policy(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    RequestId(request_id): RequestId,
    Query(query): Query<PolicyQuery>,
) -> Result<Json<PolicyResponse>, AppError> {
    let policy = state
        .policy_store
        .lookup(&query.service_name, &query.environment)
        .ok_or_else(|| {
            AppError::policy_not_found(
                request_id.clone(),
                format!(
                    "No policy configured for service '{}' in environment '{}'.",
                    query.service_name, query.environment
                ),
            )
        })?;

    if policy.service_name != query.service_name || policy.environment != query.environment {
        return Err(AppError::policy_mismatch(request_id));
    }

    let response = PolicyResponse {
        schema_version: "1.0.0".to_string(),
        agent_session_id: derive_session_id(&query.service_name, &query.environment),
        fetched_at: fetched_at_now(),
        ttl_sec: state.settings.policy_ttl_sec,
        policy: policy.clone(),
    };

    info!(
        request_id = %request_id,
        service_name = %query.service_name,
        environment = %query.environment,
        agent_session_id = %response.agent_session_id,
        "policy fetched"
    );

    let response = validate_outgoing(&state.schemas, "policy_response", &request_id, response)?;
    Ok(Json(response))
}
