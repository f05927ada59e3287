use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use arecibo_domain::ResultEnvelope;

/// The Collector's error taxonomy, surfaced in the wire envelope as
/// `result.error.code`. Each variant carries its own HTTP status.
#[derive(Debug)]
pub enum AppError {
    Unauthorized { request_id: String, message: String },
    ValidationError { request_id: String, message: String },
    PolicyNotFound { request_id: String, message: String },
    PolicyMismatch { request_id: String },
    BatchTooLarge { request_id: String },
    Internal { request_id: String, message: String },
}

impl AppError {
    pub fn unauthorized(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Unauthorized { request_id: request_id.into(), message: message.into() }
    }

    pub fn validation(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ValidationError { request_id: request_id.into(), message: message.into() }
    }

    pub fn policy_not_found(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::PolicyNotFound { request_id: request_id.into(), message: message.into() }
    }

    pub fn policy_mismatch(request_id: impl Into<String>) -> Self {
        AppError::PolicyMismatch { request_id: request_id.into() }
    }

    pub fn batch_too_large(request_id: impl Into<String>) -> Self {
        AppError::BatchTooLarge { request_id: request_id.into() }
    }

    pub fn internal(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Internal { request_id: request_id.into(), message: message.into() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, envelope) = match self {
            AppError::Unauthorized { request_id, message } => {
                (StatusCode::UNAUTHORIZED, ResultEnvelope::rejected(request_id, "unauthorized", message))
            }
            AppError::ValidationError { request_id, message } => {
                (StatusCode::BAD_REQUEST, ResultEnvelope::rejected(request_id, "validation_error", message))
            }
            AppError::PolicyNotFound { request_id, message } => {
                (StatusCode::NOT_FOUND, ResultEnvelope::rejected(request_id, "policy_not_found", message))
            }
            AppError::PolicyMismatch { request_id } => (
                StatusCode::FORBIDDEN,
                ResultEnvelope::rejected(request_id, "policy_mismatch", "Policy serviceName/environment mismatch."),
            ),
            AppError::BatchTooLarge { request_id } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ResultEnvelope::rejected(request_id, "batch_too_large", "events exceeds maxItems 1000"),
            ),
            AppError::Internal { request_id, message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, ResultEnvelope::retryable(request_id, "internal_error", message))
            }
        };
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_401() {
        let response = AppError::unauthorized("r1", "missing key").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_batch_too_large_maps_to_413() {
        let response = AppError::batch_too_large("r1").into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_internal_maps_to_500_retryable() {
        let response = AppError::internal("r1", "bug").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
