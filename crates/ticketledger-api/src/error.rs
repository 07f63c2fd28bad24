//! API error handling: maps `EngineError::kind()` to an
//! HTTP status and a stable JSON body so the edge never leaks an internal
//! message to a client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use ticketledger_types::{EngineError, ErrorKind};

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    /// What the client sees. Kept generic for anything above `Malformed`
    /// severity so an internal detail never reaches the response body -
    /// the full error is still logged via `tracing::error!` at the call site.
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "authentication required")
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse { code: self.code.to_string(), message: self.message };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Maps each `EngineError` kind to its HTTP status: `InvalidInput -> 400,
/// Forbidden -> 403, NotFound -> 404, Conflict -> 409, UpstreamUnavailable
/// -> 503, Malformed/NotImplemented -> 500`. Anything the client didn't
/// directly cause gets a generic message; the original `EngineError` is
/// still available to the caller for logging before this conversion runs.
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let (status, message) = match err.kind() {
            ErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, err.to_string()),
            ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "not permitted".to_string()),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
            ErrorKind::Conflict => (StatusCode::CONFLICT, err.to_string()),
            ErrorKind::UpstreamUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "upstream service unavailable, try again shortly".to_string())
            }
            ErrorKind::Malformed => (StatusCode::INTERNAL_SERVER_ERROR, "request could not be processed".to_string()),
            ErrorKind::NotImplemented => (StatusCode::INTERNAL_SERVER_ERROR, "not implemented".to_string()),
        };
        Self { status, code: err.error_code(), message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_maps_to_conflict() {
        let err = EngineError::InsufficientBalance {
            user_id: "u1".into(),
            requested: "100.00".into(),
            available: "50.00".into(),
        };
        let api_err: ApiError = err.into();
        assert_eq!(api_err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn upstream_unavailable_message_never_leaks_reason() {
        let err = EngineError::UpstreamUnavailable {
            service: "paystack".into(),
            reason: "connection refused to internal host 10.0.0.5".into(),
        };
        let api_err: ApiError = err.into();
        assert_eq!(api_err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!api_err.message.contains("10.0.0.5"));
    }
}
