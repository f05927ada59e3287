use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use arecibo_domain::ResultEnvelope;
use serde_json::Value;
use tracing::info;

use crate::auth::ApiKeyAuth;
use crate::error::AppError;
use crate::request_id::RequestId;
use crate::state::AppState;

use super::{validate_or_reject, validate_outgoing};

/// `POST /heartbeat`: a live agent's regular keep-alive; the response
/// is where `force_go_dark`/`force_go_dark_on` surface as a
/// `GO_DARK` directive back to the agent.
pub async fn post_heartbeat(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    RequestId(request_id): RequestId,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<ResultEnvelope>), AppError> {
    validate_or_reject(&state.schemas, "heartbeat", &request_id, &payload)?;

    let status = payload.get("status");
    let identity = payload.get("identity");
    info!(
        request_id = %request_id,
        service_name = identity.and_then(|i| i.get("serviceName")).and_then(Value::as_str).unwrap_or(""),
        environment = identity.and_then(|i| i.get("environment")).and_then(Value::as_str).unwrap_or(""),
        agent_uptime_sec = status.and_then(|s| s.get("agentUptimeSec")).and_then(Value::as_u64).unwrap_or(0),
        events_received_total = status.and_then(|s| s.get("eventsReceivedTotal")).and_then(Value::as_u64).unwrap_or(0),
        events_sent_total = status.and_then(|s| s.get("eventsSentTotal")).and_then(Value::as_u64).unwrap_or(0),
        "heartbeat received"
    );

    let directives = state.settings.go_dark_directives_for("heartbeat");
    let envelope =
        validate_outgoing(&state.schemas, "result", &request_id, ResultEnvelope::success(request_id.clone(), directives))?;
    Ok((StatusCode::ACCEPTED, Json(envelope)))
}
