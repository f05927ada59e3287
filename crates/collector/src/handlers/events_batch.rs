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

const MAX_EVENTS_PER_BATCH: usize = 1000;

/// `POST /events:batch`: the batch-size cap is checked *before*
/// schema validation, so an oversized batch is rejected with
/// `batch_too_large` even if the batch would
/// otherwise fail schema validation for some other reason too.
pub async fn post_events_batch(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    RequestId(request_id): RequestId,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<ResultEnvelope>), AppError> {
    if let Some(events) = payload.get("events").and_then(Value::as_array) {
        if events.len() > MAX_EVENTS_PER_BATCH {
            return Err(AppError::batch_too_large(request_id));
        }
    }

    validate_or_reject(&state.schemas, "events_batch", &request_id, &payload)?;

    let event_count = payload.get("events").and_then(Value::as_array).map(Vec::len).unwrap_or(0);
    info!(
        request_id = %request_id,
        agent_session_id = payload.get("agentSessionId").and_then(Value::as_str).unwrap_or(""),
        batch_id = payload.get("batchId").and_then(Value::as_str).unwrap_or(""),
        event_count,
        "events batch received"
    );

    let directives = state.settings.go_dark_directives_for("events");
    let envelope =
        validate_outgoing(&state.schemas, "result", &request_id, ResultEnvelope::success(request_id.clone(), directives))?;
    Ok((StatusCode::ACCEPTED, Json(envelope)))
}
