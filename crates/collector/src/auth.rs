use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::request_id::RequestId;
use crate::state::AppState;

/// Extractor that authenticates `X-API-Key` against the configured
/// key set before a handler runs. Every ingest endpoint depends on
/// this first.
pub struct ApiKeyAuth;

impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .extensions
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_default();

        let api_key = parts
            .headers
            .get("X-API-Key")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized(request_id.clone(), "Missing X-API-Key."))?;

        if !state.settings.api_keys.contains(api_key) {
            return Err(AppError::unauthorized(request_id, "Invalid X-API-Key."));
        }

        Ok(ApiKeyAuth)
    }
}
