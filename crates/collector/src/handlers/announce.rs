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

/// `POST /announce`: validates against the `announce` schema, logs
/// the identity block, returns a plain `ok` result — go-dark
/// directives are never attached here, only on
/// heartbeat/events (see `crate::config::Settings::go_dark_directives_for`).
pub async fn post_announce(
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    RequestId(request_id): RequestId,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<ResultEnvelope>), AppError> {
    validate_or_reject(&state.schemas, "announce", &request_id, &payload)?;

    if let Some(identity) = payload.get("identity") {
        info!(
            request_id = %request_id,
            service_name = identity.get("serviceName").and_then(Value::as_str).unwrap_or(""),
            environment = identity.get("environment").and_then(Value::as_str).unwrap_or(""),
            instance_id = identity.get("instanceId").and_then(Value::as_str).unwrap_or(""),
            "announce received"
        );
    }

    let envelope = validate_outgoing(&state.schemas, "result", &request_id, ResultEnvelope::ok(request_id.clone()))?;
    Ok((StatusCode::ACCEPTED, Json(envelope)))
}
