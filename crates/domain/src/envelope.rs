use serde::{Deserialize, Serialize};

use crate::directive::Directive;

/// Status discriminant carried inside every `result` envelope.
///
/// `Directive` is a status in its own right, not a modifier on `Ok` —
/// a 202 response either plainly succeeded, carries directives to
/// apply, was rejected outright (4xx), or failed in a way the Agent
/// should retry later (5xx).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
    Rejected,
    Retryable,
    Directive,
}

/// Error detail nested inside a `result` envelope when `status` is
/// `rejected` or `retryable`. `code` is a stable machine-readable
/// token (see the collector's `ErrorCode`), `message` is
/// human-readable and safe to log verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// The `{"result": {...}}` wrapper every Collector endpoint responds
/// with, except bare `GET /policy` (see [`crate::policy::PolicyResponse`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBody {
    pub status: ResultStatus,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directives: Option<Vec<Directive>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub result: ResultBody,
}

impl ResultEnvelope {
    pub fn ok(request_id: impl Into<String>) -> Self {
        ResultEnvelope {
            result: ResultBody {
                status: ResultStatus::Ok,
                request_id: request_id.into(),
                error: None,
                directives: None,
            },
        }
    }

    /// `status: "directive"` with a non-empty directives list. Callers
    /// that have no directives to attach should call [`Self::ok`]
    /// instead — an empty `directives` array is never sent.
    pub fn directive(request_id: impl Into<String>, directives: Vec<Directive>) -> Self {
        ResultEnvelope {
            result: ResultBody {
                status: ResultStatus::Directive,
                request_id: request_id.into(),
                error: None,
                directives: Some(directives),
            },
        }
    }

    /// `status: "ok"` when `directives` is empty, `status: "directive"`
    /// otherwise — the common case of "build a success response, attach
    /// whatever the directive engine decided to attach".
    pub fn success(request_id: impl Into<String>, directives: Vec<Directive>) -> Self {
        if directives.is_empty() {
            Self::ok(request_id)
        } else {
            Self::directive(request_id, directives)
        }
    }

    pub fn rejected(request_id: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        ResultEnvelope {
            result: ResultBody {
                status: ResultStatus::Rejected,
                request_id: request_id.into(),
                error: Some(ErrorDetail {
                    code: code.into(),
                    message: message.into(),
                }),
                directives: None,
            },
        }
    }

    pub fn retryable(request_id: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        ResultEnvelope {
            result: ResultBody {
                status: ResultStatus::Retryable,
                request_id: request_id.into(),
                error: Some(ErrorDetail {
                    code: code.into(),
                    message: message.into(),
                }),
                directives: None,
            },
        }
    }
}
