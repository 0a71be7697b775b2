//! Application error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Authentication failures returned by the auth manager
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("unknown user")]
    UnknownUser,

    #[error("bad password")]
    BadPassword,

    #[error("invalid token")]
    InvalidToken,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::UnknownUser => "unknown_user",
            AuthError::BadPassword => "bad_password",
            AuthError::InvalidToken => "invalid_token",
        }
    }
}

/// Top-level application error
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("daily quota exceeded for {0}")]
    QuotaExceeded(&'static str),

    #[error("timed out waiting for a reply from the worker")]
    Timeout,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Stable string code carried in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::BackendUnavailable(_) => "backend_unavailable",
            AppError::MalformedUpstreamResponse(_) => "malformed_upstream_response",
            AppError::Auth(e) => e.code(),
            AppError::QuotaExceeded(_) => "quota_exceeded",
            AppError::Timeout => "timeout",
            AppError::NotFound(_) => "not_found",
            AppError::Config(_) => "config_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::BackendUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::MalformedUpstreamResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));

        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(AppError::InvalidRequest("x".into()).code(), "invalid_request");
        assert_eq!(AppError::Auth(AuthError::UnknownUser).code(), "unknown_user");
        assert_eq!(AppError::Auth(AuthError::BadPassword).code(), "bad_password");
        assert_eq!(AppError::QuotaExceeded("chat").code(), "quota_exceeded");
    }

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            AppError::InvalidRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Auth(AuthError::InvalidToken).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            AppError::BackendUnavailable("down".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
