use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lx_quota::QuotaError;
use serde::Serialize;

/// JSON error body. `error` carries the human-readable message clients
/// already match on; `code` is the stable machine identifier.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub retryable: bool,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn missing_client_id() -> Self {
        Self::new("MISSING_CLIENT_ID", "Missing X-Client-ID")
    }

    pub fn invalid_plan() -> Self {
        Self::new("INVALID_PLAN", "planId inválido")
    }

    pub fn invalid_signature() -> Self {
        Self::new("INVALID_SIGNATURE", "invalid_signature")
    }

    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::new("INVALID_EVENT", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message).retryable()
    }

    pub fn quota_error(err: &QuotaError) -> (StatusCode, Self) {
        match err {
            QuotaError::InvalidPlan(_) => (StatusCode::BAD_REQUEST, Self::invalid_plan()),
            QuotaError::CorruptRecord { key, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Self::internal(err.to_string())
                    .with_details(serde_json::json!({ "kind": err.error_code(), "key": key })),
            ),
            QuotaError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Self::internal(err.to_string())
                    .with_details(serde_json::json!({ "kind": err.error_code() })),
            ),
        }
    }
}

#[derive(Debug)]
pub struct ApiErrorResponse {
    pub status: StatusCode,
    pub error: ApiError,
}

impl ApiErrorResponse {
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let body = serde_json::to_string(&self.error).unwrap_or_default();
        (self.status, [("content-type", "application/json")], body).into_response()
    }
}

impl From<(StatusCode, ApiError)> for ApiErrorResponse {
    fn from((status, error): (StatusCode, ApiError)) -> Self {
        Self { status, error }
    }
}

impl From<QuotaError> for ApiErrorResponse {
    fn from(err: QuotaError) -> Self {
        if !matches!(err, QuotaError::InvalidPlan(_)) {
            tracing::error!("Quota operation failed: {}", err);
        }
        ApiError::quota_error(&err).into()
    }
}
