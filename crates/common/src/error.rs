//! Error types shared by the agent and the collector.
//!
//! A single enum wraps the handful of failure modes that cross crate
//! boundaries; anything more specific stays local to its module.

use thiserror::Error;

/// Top-level error type for Arecibo operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration was missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A JSON payload could not be parsed or serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation of an ingest payload or request failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A downstream HTTP call failed at the transport level.
    #[error("transport error: {0}")]
    Transport(String),

    /// Generic catch-all for errors propagated via anyhow.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for Arecibo operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Validation("ts must end in Z".to_string());
        assert_eq!(err.to_string(), "validation error: ts must end in Z");
    }

    #[test]
    fn test_error_conversion_from_anyhow() {
        let anyhow_err = anyhow::anyhow!("boom");
        let err: Error = anyhow_err.into();
        assert!(matches!(err, Error::Internal(_)));
    }
}
